/// STL loading (binary and ASCII) into wireframe geometry
///
/// Each triangle contributes its three edges. Vertices with identical
/// coordinates and edges shared between faces are merged, so a closed mesh
/// yields every edge once.
use nom::{
    bytes::complete::tag,
    character::complete::{multispace0, multispace1, not_line_ending, space0},
    multi::many0,
    number::complete::float,
    sequence::preceded,
    IResult,
};
use tracing::debug;

use crate::error::StlError;
use crate::geometry::{Geometry, GeometryBuilder};

const HEADER_LEN: usize = 80;
const RECORD_LEN: usize = 50;

type Corners = [[f32; 3]; 3];

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> Result<Geometry, StlError> {
    if data.len() < HEADER_LEN + 4 {
        return Err(StlError::TooSmall(data.len()));
    }

    let count_bytes = [data[80], data[81], data[82], data[83]];
    let declared = u32::from_le_bytes(count_bytes) as usize;
    let records = &data[HEADER_LEN + 4..];
    let available = records.len() / RECORD_LEN;
    if available < declared {
        return Err(StlError::Truncated {
            declared,
            available,
        });
    }

    let mut builder = GeometryBuilder::new();
    for record in records.chunks_exact(RECORD_LEN).take(declared) {
        // 12 bytes of normal, 3 x 12 bytes of corners, 2 attribute bytes.
        let mut corners = [[0.0; 3]; 3];
        for (i, corner) in corners.iter_mut().enumerate() {
            let base = 12 + i * 12;
            for (axis, value) in corner.iter_mut().enumerate() {
                let at = base + axis * 4;
                *value = f32::from_le_bytes([
                    record[at],
                    record[at + 1],
                    record[at + 2],
                    record[at + 3],
                ]);
            }
        }
        builder.triangle(corners);
    }

    let geometry = builder.build();
    debug!(
        triangles = declared,
        vertices = geometry.vertex_count(),
        edges = geometry.edge_count(),
        "loaded binary STL"
    );
    Ok(geometry)
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> Result<Geometry, StlError> {
    let (_, facets) = parse_solid(input).map_err(|e| StlError::Ascii(e.to_string()))?;

    let mut builder = GeometryBuilder::new();
    for corners in &facets {
        builder.triangle(*corners);
    }

    let geometry = builder.build();
    debug!(
        triangles = facets.len(),
        vertices = geometry.vertex_count(),
        edges = geometry.edge_count(),
        "loaded ASCII STL"
    );
    Ok(geometry)
}

fn parse_solid(input: &str) -> IResult<&str, Vec<Corners>> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, _) = preceded(space0, not_line_ending)(input)?; // Optional name
    let (input, facets) = many0(parse_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;
    Ok((input, facets))
}

fn parse_facet(input: &str) -> IResult<&str, Corners> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, _normal) = parse_vector3(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, v1) = parse_vertex(input)?;
    let (input, v2) = parse_vertex(input)?;
    let (input, v3) = parse_vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((input, [v1, v2, v3]))
}

fn parse_vertex(input: &str) -> IResult<&str, [f32; 3]> {
    preceded(preceded(multispace0, tag("vertex")), parse_vector3)(input)
}

fn parse_vector3(input: &str) -> IResult<&str, [f32; 3]> {
    let (input, _) = multispace0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, [x, y, z]))
}

/// Detect and parse STL file (binary or ASCII)
pub fn parse_stl(data: &[u8]) -> Result<Geometry, StlError> {
    // Binary files may also start with "solid", so fall back on failure.
    if data.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            if let Ok(geometry) = parse_ascii_stl(text) {
                return Ok(geometry);
            }
        }
    }

    parse_binary_stl(data)
}
