//! Sectors section: the spatial partition. Each sector owns a contiguous
//! run of surfaces and adjoins by index range into the georesource pools.

use crate::codec::{Decode, Encode, StreamExt};
use crate::error::{Error, Result};
use crate::header::CndHeader;
use crate::math::{Color, Vector3f};
use crate::sections::georesource;
use crate::stream::Stream;

pub const SECTION: &str = "sectors";

pub const SECTOR_SIZE: u64 = 104;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sector {
    pub flags: u32,
    pub ambient_light: Color,
    pub extra_light: Color,
    pub tint: Vector3f,
    pub bound_min: Vector3f,
    pub bound_max: Vector3f,
    pub center: Vector3f,
    pub radius: f32,
    pub first_surface: u32,
    pub surface_count: u32,
    pub first_adjoin: u32,
    pub adjoin_count: u32,
}

impl Decode for Sector {
    fn decode<S: Stream + ?Sized>(stream: &mut S) -> Result<Self> {
        Ok(Self {
            flags: stream.read_u32()?,
            ambient_light: Color::decode(stream)?,
            extra_light: Color::decode(stream)?,
            tint: Vector3f::decode(stream)?,
            bound_min: Vector3f::decode(stream)?,
            bound_max: Vector3f::decode(stream)?,
            center: Vector3f::decode(stream)?,
            radius: stream.read_f32()?,
            first_surface: stream.read_u32()?,
            surface_count: stream.read_u32()?,
            first_adjoin: stream.read_u32()?,
            adjoin_count: stream.read_u32()?,
        })
    }
}

impl Encode for Sector {
    fn encode<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<()> {
        stream.write_u32(self.flags)?;
        self.ambient_light.encode(stream)?;
        self.extra_light.encode(stream)?;
        self.tint.encode(stream)?;
        self.bound_min.encode(stream)?;
        self.bound_max.encode(stream)?;
        self.center.encode(stream)?;
        stream.write_f32(self.radius)?;
        stream.write_u32(self.first_surface)?;
        stream.write_u32(self.surface_count)?;
        stream.write_u32(self.first_adjoin)?;
        stream.write_u32(self.adjoin_count)
    }
}

pub fn offset(header: &CndHeader) -> u64 {
    georesource::offset(header) + georesource::declared_size(header)
}

pub fn declared_size(header: &CndHeader) -> u64 {
    header.num_sectors as u64 * SECTOR_SIZE
}

pub fn parse<S: Stream + ?Sized>(stream: &mut S, header: &CndHeader) -> Result<Vec<Sector>> {
    let start = stream.tell();
    parse_inner(stream, header, start).map_err(|e| e.into_section(SECTION, start))
}

fn parse_inner<S: Stream + ?Sized>(
    stream: &mut S,
    header: &CndHeader,
    start: u64,
) -> Result<Vec<Sector>> {
    let declared = declared_size(header);
    if start + declared > stream.len() {
        return Err(Error::section(
            SECTION,
            start,
            format!(
                "{} sectors need {declared} bytes, stream has {}",
                header.num_sectors,
                stream.len().saturating_sub(start)
            ),
        ));
    }

    let sectors: Vec<Sector> = stream.read_seq(header.num_sectors as usize)?;
    for (i, sector) in sectors.iter().enumerate() {
        let surface_end = sector.first_surface as u64 + sector.surface_count as u64;
        if surface_end > header.num_surfaces as u64 {
            return Err(Error::section(
                SECTION,
                start + i as u64 * SECTOR_SIZE,
                format!(
                    "sector {i} references surfaces {}..{surface_end} of {}",
                    sector.first_surface, header.num_surfaces
                ),
            ));
        }
        let adjoin_end = sector.first_adjoin as u64 + sector.adjoin_count as u64;
        if adjoin_end > header.num_adjoins as u64 {
            return Err(Error::section(
                SECTION,
                start + i as u64 * SECTOR_SIZE,
                format!(
                    "sector {i} references adjoins {}..{adjoin_end} of {}",
                    sector.first_adjoin, header.num_adjoins
                ),
            ));
        }
    }
    Ok(sectors)
}

pub fn read<S: Stream + ?Sized>(stream: &mut S) -> Result<Vec<Sector>> {
    stream.seek(0)?;
    let header = CndHeader::read(stream)?;
    stream.seek(offset(&header))?;
    parse(stream, &header)
}

pub fn write<S: Stream + ?Sized>(stream: &mut S, sectors: &[Sector]) -> Result<()> {
    stream.write_seq(sectors)
}

pub fn byte_size(sectors: &[Sector]) -> u64 {
    sectors.len() as u64 * SECTOR_SIZE
}
