/// Wavefront OBJ parser (positions, normals and polygon faces)
use nalgebra::{Point3, Vector3};
use nom::{
    bytes::complete::is_not,
    character::complete::{char, i64 as integer, space0, space1},
    combinator::{all_consuming, opt},
    multi::many1,
    number::complete::float,
    sequence::{preceded, terminated, tuple},
    IResult,
};
use thiserror::Error;

use crate::geometry::{Mesh, Triangle, Vertex};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ObjError {
    #[error("line {line}: cannot parse `{content}`")]
    Syntax { line: usize, content: String },

    #[error("line {line}: index {index} does not refer to a defined element")]
    IndexOutOfRange { line: usize, index: i64 },

    #[error("line {line}: face needs at least three vertices")]
    FaceTooSmall { line: usize },
}

/// One `v/vt/vn` reference inside a face record
#[derive(Debug, Clone, Copy, PartialEq)]
struct FaceVertex {
    position: i64,
    normal: Option<i64>,
}

enum Record {
    Position(Point3<f32>),
    Normal(Vector3<f32>),
    Face(Vec<FaceVertex>),
    Ignored,
}

/// Parse OBJ text into a triangle mesh.
///
/// Polygons are fan-triangulated. Faces without `vn` references use their
/// geometric normal. Texture coordinates, groups and material statements
/// are skipped.
pub fn parse_obj(input: &str) -> Result<Mesh, ObjError> {
    let mut positions: Vec<Point3<f32>> = Vec::new();
    let mut normals: Vec<Vector3<f32>> = Vec::new();
    let mut mesh = Mesh::new();

    for (number, raw) in input.lines().enumerate() {
        let line = number + 1;
        let content = raw.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }

        let record = match all_consuming(parse_record)(content) {
            Ok((_, record)) => record,
            Err(_) => {
                return Err(ObjError::Syntax {
                    line,
                    content: content.to_string(),
                })
            }
        };

        match record {
            Record::Position(p) => positions.push(p),
            Record::Normal(n) => normals.push(n),
            Record::Face(refs) => {
                if refs.len() < 3 {
                    return Err(ObjError::FaceTooSmall { line });
                }

                let mut corners = Vec::with_capacity(refs.len());
                for r in &refs {
                    let position = positions[resolve(r.position, positions.len(), line)?];
                    let normal = match r.normal {
                        Some(index) => Some(normals[resolve(index, normals.len(), line)?]),
                        None => None,
                    };
                    corners.push((position, normal));
                }

                for i in 1..corners.len() - 1 {
                    mesh.add_triangle(triangle(corners[0], corners[i], corners[i + 1]));
                }
            }
            Record::Ignored => {}
        }
    }

    Ok(mesh)
}

/// Map a 1-based (or negative, relative) OBJ index to a slice index
fn resolve(index: i64, len: usize, line: usize) -> Result<usize, ObjError> {
    let resolved = if index > 0 {
        index - 1
    } else {
        len as i64 + index
    };

    if index == 0 || resolved < 0 || resolved >= len as i64 {
        return Err(ObjError::IndexOutOfRange { line, index });
    }
    Ok(resolved as usize)
}

type Corner = (Point3<f32>, Option<Vector3<f32>>);

fn triangle(a: Corner, b: Corner, c: Corner) -> Triangle {
    let corner = |position: Point3<f32>| Vertex {
        position,
        normal: Vector3::zeros(),
    };
    let mut face = Triangle::new(corner(a.0), corner(b.0), corner(c.0));
    let fallback = face.calculate_normal();
    for (vertex, normal) in face.vertices.iter_mut().zip([a.1, b.1, c.1]) {
        vertex.normal = normal.unwrap_or(fallback);
    }
    face
}

fn parse_record(input: &str) -> IResult<&str, Record> {
    let (rest, keyword) = terminated(is_not(" \t"), space0)(input)?;
    match keyword {
        "v" => {
            let (rest, (x, y, z)) = vector3(rest)?;
            // optional homogeneous weight
            let (rest, _w) = opt(preceded(space1, float))(rest)?;
            Ok((rest, Record::Position(Point3::new(x, y, z))))
        }
        "vn" => {
            let (rest, (x, y, z)) = vector3(rest)?;
            Ok((rest, Record::Normal(Vector3::new(x, y, z))))
        }
        "f" => {
            let (rest, refs) = many1(terminated(face_vertex, space0))(rest)?;
            Ok((rest, Record::Face(refs)))
        }
        _ => Ok(("", Record::Ignored)),
    }
}

fn vector3(input: &str) -> IResult<&str, (f32, f32, f32)> {
    tuple((float, preceded(space1, float), preceded(space1, float)))(input)
}

fn face_vertex(input: &str) -> IResult<&str, FaceVertex> {
    let (input, position) = integer(input)?;
    let (input, _texcoord) = opt(preceded(char('/'), opt(integer)))(input)?;
    let (input, normal) = opt(preceded(char('/'), integer))(input)?;
    Ok((input, FaceVertex { position, normal }))
}
