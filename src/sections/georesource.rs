//! Georesource section: world geometry. Vertex pools, portal adjoins and
//! the surfaces stitching them together.
//!
//! A structural section: the header stores no byte size for it, so both its
//! offset (right after materials) and its length are computed in closed form
//! from the four element counts.

use crate::codec::{Decode, Encode, StreamExt};
use crate::error::{Error, Result};
use crate::header::CndHeader;
use crate::math::{Color, Vector2f, Vector3f};
use crate::sections::materials;
use crate::stream::Stream;

pub const SECTION: &str = "georesource";

pub const VERTEX_SIZE: u64 = 12;
pub const TEX_VERTEX_SIZE: u64 = 8;
pub const ADJOIN_SIZE: u64 = 12;
pub const SURFACE_SIZE: u64 = 60;

/// Portal connectivity record between two sectors.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceAdjoin {
    pub flags: u32,
    /// Index of the mirroring adjoin on the far side, or -1.
    pub mirror: i32,
    pub distance: f32,
}

impl Decode for SurfaceAdjoin {
    fn decode<S: Stream + ?Sized>(stream: &mut S) -> Result<Self> {
        Ok(Self {
            flags: stream.read_u32()?,
            mirror: stream.read_i32()?,
            distance: stream.read_f32()?,
        })
    }
}

impl Encode for SurfaceAdjoin {
    fn encode<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<()> {
        stream.write_u32(self.flags)?;
        stream.write_i32(self.mirror)?;
        stream.write_f32(self.distance)
    }
}

/// A world face referencing a contiguous run of the shared vertex pools.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Surface {
    /// Material index, or -1 for an untextured surface.
    pub material: i32,
    pub flags: u32,
    pub geo_mode: u32,
    pub light_mode: u32,
    /// Adjoin index for portal surfaces, or -1.
    pub adjoin: i32,
    pub extra_light: Color,
    pub normal: Vector3f,
    pub first_vertex: u32,
    pub first_tex_vertex: u32,
    pub vertex_count: u32,
}

impl Decode for Surface {
    fn decode<S: Stream + ?Sized>(stream: &mut S) -> Result<Self> {
        Ok(Self {
            material: stream.read_i32()?,
            flags: stream.read_u32()?,
            geo_mode: stream.read_u32()?,
            light_mode: stream.read_u32()?,
            adjoin: stream.read_i32()?,
            extra_light: Color::decode(stream)?,
            normal: Vector3f::decode(stream)?,
            first_vertex: stream.read_u32()?,
            first_tex_vertex: stream.read_u32()?,
            vertex_count: stream.read_u32()?,
        })
    }
}

impl Encode for Surface {
    fn encode<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<()> {
        stream.write_i32(self.material)?;
        stream.write_u32(self.flags)?;
        stream.write_u32(self.geo_mode)?;
        stream.write_u32(self.light_mode)?;
        stream.write_i32(self.adjoin)?;
        self.extra_light.encode(stream)?;
        self.normal.encode(stream)?;
        stream.write_u32(self.first_vertex)?;
        stream.write_u32(self.first_tex_vertex)?;
        stream.write_u32(self.vertex_count)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Georesource {
    pub vertices: Vec<Vector3f>,
    pub tex_vertices: Vec<Vector2f>,
    pub adjoins: Vec<SurfaceAdjoin>,
    pub surfaces: Vec<Surface>,
}

pub fn offset(header: &CndHeader) -> u64 {
    materials::offset(header) + header.size_materials as u64
}

/// Closed-form section length from the header's element counts.
pub fn declared_size(header: &CndHeader) -> u64 {
    header.num_vertices as u64 * VERTEX_SIZE
        + header.num_tex_vertices as u64 * TEX_VERTEX_SIZE
        + header.num_adjoins as u64 * ADJOIN_SIZE
        + header.num_surfaces as u64 * SURFACE_SIZE
}

pub fn parse<S: Stream + ?Sized>(stream: &mut S, header: &CndHeader) -> Result<Georesource> {
    let start = stream.tell();
    parse_inner(stream, header, start).map_err(|e| e.into_section(SECTION, start))
}

fn parse_inner<S: Stream + ?Sized>(
    stream: &mut S,
    header: &CndHeader,
    start: u64,
) -> Result<Georesource> {
    let declared = declared_size(header);
    if start + declared > stream.len() {
        return Err(Error::section(
            SECTION,
            start,
            format!(
                "element counts imply {declared} bytes, stream has {}",
                stream.len().saturating_sub(start)
            ),
        ));
    }

    let vertices: Vec<Vector3f> = stream.read_seq(header.num_vertices as usize)?;
    let tex_vertices: Vec<Vector2f> = stream.read_seq(header.num_tex_vertices as usize)?;
    let adjoins: Vec<SurfaceAdjoin> = stream.read_seq(header.num_adjoins as usize)?;

    let surfaces_at = stream.tell();
    let surfaces: Vec<Surface> = stream.read_seq(header.num_surfaces as usize)?;
    for (i, surface) in surfaces.iter().enumerate() {
        let vertex_end = surface.first_vertex as u64 + surface.vertex_count as u64;
        if vertex_end > header.num_vertices as u64 {
            return Err(Error::section(
                SECTION,
                surfaces_at + i as u64 * SURFACE_SIZE,
                format!(
                    "surface {i} references vertices {}..{vertex_end} of {}",
                    surface.first_vertex, header.num_vertices
                ),
            ));
        }
        let tex_end = surface.first_tex_vertex as u64 + surface.vertex_count as u64;
        if tex_end > header.num_tex_vertices as u64 {
            return Err(Error::section(
                SECTION,
                surfaces_at + i as u64 * SURFACE_SIZE,
                format!(
                    "surface {i} references texture vertices {}..{tex_end} of {}",
                    surface.first_tex_vertex, header.num_tex_vertices
                ),
            ));
        }
        if surface.adjoin >= 0 && surface.adjoin as u64 >= header.num_adjoins as u64 {
            return Err(Error::section(
                SECTION,
                surfaces_at + i as u64 * SURFACE_SIZE,
                format!("surface {i} references adjoin {} of {}", surface.adjoin, header.num_adjoins),
            ));
        }
    }

    Ok(Georesource {
        vertices,
        tex_vertices,
        adjoins,
        surfaces,
    })
}

pub fn read<S: Stream + ?Sized>(stream: &mut S) -> Result<Georesource> {
    stream.seek(0)?;
    let header = CndHeader::read(stream)?;
    stream.seek(offset(&header))?;
    parse(stream, &header)
}

pub fn write<S: Stream + ?Sized>(stream: &mut S, geo: &Georesource) -> Result<()> {
    stream.write_seq(&geo.vertices)?;
    stream.write_seq(&geo.tex_vertices)?;
    stream.write_seq(&geo.adjoins)?;
    stream.write_seq(&geo.surfaces)
}

pub fn byte_size(geo: &Georesource) -> u64 {
    geo.vertices.len() as u64 * VERTEX_SIZE
        + geo.tex_vertices.len() as u64 * TEX_VERTEX_SIZE
        + geo.adjoins.len() as u64 * ADJOIN_SIZE
        + geo.surfaces.len() as u64 * SURFACE_SIZE
}
