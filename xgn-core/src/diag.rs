/// Numbered diagnostics routed through the `log` facade
use std::fmt;

use log::Level;

pub const LOG_TARGET: &str = "xgn";

/// Diagnostic severity, 0 (informational) through 3 (error)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Severity {
    Info = 0,
    Notice = 1,
    Warning = 2,
    Error = 3,
}

impl Severity {
    pub fn level(self) -> Level {
        match self {
            Severity::Info => Level::Debug,
            Severity::Notice => Level::Info,
            Severity::Warning => Level::Warn,
            Severity::Error => Level::Error,
        }
    }
}

/// Numeric tag identifying the step that emitted a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagCode(pub u16);

impl DiagCode {
    pub const SETUP_ROOT: DiagCode = DiagCode(0x3001);
    pub const CREATE_TRANSFORM: DiagCode = DiagCode(0x3002);
    pub const LOAD_OBJECT: DiagCode = DiagCode(0x3003);
    pub const SETUP_CAMERA: DiagCode = DiagCode(0x3004);
    pub const SETUP_VIEW: DiagCode = DiagCode(0x3005);
    pub const SETUP_OBJECTS: DiagCode = DiagCode(0x3006);
    pub const MESH_LOAD_FAILED: DiagCode = DiagCode(0x9002);
    pub const NO_ACTIVE_SCENE: DiagCode = DiagCode(0x9003);
    pub const STALE_TRANSFORM: DiagCode = DiagCode(0x9004);
    pub const INVALID_CAMERA: DiagCode = DiagCode(0x9005);
}

impl fmt::Display for DiagCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

/// Emit a diagnostic. The message is optional, the code never is.
pub fn emit(code: DiagCode, severity: Severity, message: Option<&str>) {
    match message {
        Some(text) => log::log!(target: LOG_TARGET, severity.level(), "[{}] {}", code, text),
        None => log::log!(target: LOG_TARGET, severity.level(), "[{}]", code),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_formatting() {
        assert_eq!(DiagCode::SETUP_ROOT.to_string(), "0x3001");
        assert_eq!(DiagCode::MESH_LOAD_FAILED.to_string(), "0x9002");
        assert_eq!(DiagCode(0xab).to_string(), "0x00AB");
    }

    #[test]
    fn test_severity_levels() {
        assert_eq!(Severity::Info as u8, 0);
        assert_eq!(Severity::Error as u8, 3);
        assert_eq!(Severity::Error.level(), Level::Error);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn test_emit_prefixes_code() {
        capture::install();
        emit(DiagCode::STALE_TRANSFORM, Severity::Warning, Some("diag-emit-check"));
        emit(DiagCode(0x0042), Severity::Notice, None);

        assert_eq!(
            capture::matching("[0x9004] diag-emit-check"),
            vec![(
                Level::Warn,
                LOG_TARGET.to_string(),
                "[0x9004] diag-emit-check".to_string()
            )]
        );
        assert_eq!(capture::matching("[0x0042]")[0].0, Level::Info);
    }
}
