//! Materials section: named textures with their mip-mapped pixel payloads.
//!
//! First section after the header. Elements are keyed by name; the map keeps
//! file order, so writing iterates in the order the materials were parsed
//! and a round trip reproduces the original byte order.

use indexmap::IndexMap;

use crate::codec::{CndName, Decode, Encode, StreamExt};
use crate::error::{Error, Result};
use crate::header::{CndHeader, HEADER_SIZE};
use crate::stream::Stream;

pub const SECTION: &str = "materials";

/// Fixed part of a material record: 64-byte name + four u32 fields.
const RECORD_HEADER_SIZE: u64 = 64 + 16;

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: CndName,
    pub width: u32,
    pub height: u32,
    /// Bits per pixel of the stored texture data (16 or 32).
    pub bpp: u32,
    pub mip_levels: u32,
    /// Raw texel data for the whole mip chain, largest level first.
    pub pixel_data: Vec<u8>,
}

impl Material {
    /// Byte length of the pixel payload implied by dimensions, pixel format
    /// and mip chain. `None` for a malformed format (bpp not a whole number
    /// of bytes) or an overflowing product.
    pub fn pixel_data_size(width: u32, height: u32, bpp: u32, mip_levels: u32) -> Option<u64> {
        if bpp == 0 || bpp % 8 != 0 {
            return None;
        }
        let mut total: u64 = 0;
        for level in 0..mip_levels {
            let w = (width >> level).max(1) as u64;
            let h = (height >> level).max(1) as u64;
            total = total.checked_add(w.checked_mul(h)?.checked_mul(bpp as u64 / 8)?)?;
        }
        Some(total)
    }

    /// Serialized length of this record.
    pub fn record_size(&self) -> u64 {
        RECORD_HEADER_SIZE + self.pixel_data.len() as u64
    }
}

/// Materials keyed by name, iteration in file order.
pub type MaterialMap = IndexMap<String, Material>;

pub fn offset(_header: &CndHeader) -> u64 {
    HEADER_SIZE
}

/// Decode the section at the stream's current position. All-or-nothing:
/// any malformed record aborts the whole parse.
pub fn parse<S: Stream + ?Sized>(stream: &mut S, header: &CndHeader) -> Result<MaterialMap> {
    let start = stream.tell();
    parse_inner(stream, header, start).map_err(|e| e.into_section(SECTION, start))
}

fn parse_inner<S: Stream + ?Sized>(
    stream: &mut S,
    header: &CndHeader,
    start: u64,
) -> Result<MaterialMap> {
    let declared = header.size_materials as u64;
    let count = header.num_materials as u64;
    if count * RECORD_HEADER_SIZE > declared {
        return Err(Error::section(
            SECTION,
            start,
            format!("{count} records cannot fit the declared {declared} bytes"),
        ));
    }
    if start + declared > stream.len() {
        return Err(Error::section(
            SECTION,
            start,
            format!("declared size {declared} exceeds the stream"),
        ));
    }
    let end = start + declared;

    let mut materials = MaterialMap::with_capacity(header.num_materials as usize);
    for _ in 0..header.num_materials {
        let record_at = stream.tell();
        let name = CndName::decode(stream)?;
        let width = stream.read_u32()?;
        let height = stream.read_u32()?;
        let bpp = stream.read_u32()?;
        let mip_levels = stream.read_u32()?;

        let payload = Material::pixel_data_size(width, height, bpp, mip_levels).ok_or_else(|| {
            Error::section(SECTION, record_at, format!("invalid pixel format: {bpp} bpp"))
        })?;
        if stream.tell() + payload > end {
            return Err(Error::section(
                SECTION,
                record_at,
                format!("{payload}-byte pixel payload overruns the declared section size"),
            ));
        }
        let pixel_data = stream.read_buf(payload as usize)?;

        let key = name.as_str().to_owned();
        let material = Material {
            name,
            width,
            height,
            bpp,
            mip_levels,
            pixel_data,
        };
        if materials.insert(key.clone(), material).is_some() {
            return Err(Error::section(
                SECTION,
                record_at,
                format!("duplicate material name {key:?}"),
            ));
        }
    }

    if stream.tell() != end {
        return Err(Error::section(
            SECTION,
            start,
            format!(
                "section occupies {} bytes, header declares {declared}",
                stream.tell() - start
            ),
        ));
    }
    Ok(materials)
}

/// Convenience composition: read the header, seek to this section, parse.
pub fn read<S: Stream + ?Sized>(stream: &mut S) -> Result<MaterialMap> {
    stream.seek(0)?;
    let header = CndHeader::read(stream)?;
    stream.seek(offset(&header))?;
    parse(stream, &header)
}

/// Serialize all materials in map order at the stream's current position.
pub fn write<S: Stream + ?Sized>(stream: &mut S, materials: &MaterialMap) -> Result<()> {
    for material in materials.values() {
        let expected = Material::pixel_data_size(
            material.width,
            material.height,
            material.bpp,
            material.mip_levels,
        );
        if expected != Some(material.pixel_data.len() as u64) {
            return Err(Error::section(
                SECTION,
                stream.tell(),
                format!(
                    "material {:?}: pixel data is {} bytes, dimensions imply {:?}",
                    material.name.as_str(),
                    material.pixel_data.len(),
                    expected
                ),
            ));
        }
        material.name.encode(stream)?;
        stream.write_u32(material.width)?;
        stream.write_u32(material.height)?;
        stream.write_u32(material.bpp)?;
        stream.write_u32(material.mip_levels)?;
        stream.write_buf(&material.pixel_data)?;
    }
    Ok(())
}

/// Serialized byte length of the whole section.
pub fn byte_size(materials: &MaterialMap) -> u64 {
    materials.values().map(Material::record_size).sum()
}
