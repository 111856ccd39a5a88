//! Fixed-layout container header.
//!
//! The header is a pure structural codec: it reads and writes the 1568-byte
//! record verbatim and performs no cross-checking of its `size`/`count`
//! fields against the sections that follow. [`crate::world::CndWorld`]
//! recomputes those fields before writing.

use crate::codec::{Decode, Encode, FixedString, StreamExt};
use crate::error::Result;
use crate::math::{Color, Vector2f, Vector4f};
use crate::stream::Stream;

/// Serialized header length in bytes.
pub const HEADER_SIZE: u64 = 1568;

/// `file_type` of the static resource container (jones3dstatic.cnd).
pub const FILE_TYPE_CONTAINER: u32 = 0xD;
/// `file_type` of a game world.
pub const FILE_TYPE_WORLD: u32 = 0xC;

/// Distance fog parameters embedded in the header.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CndFog {
    pub enabled: i32,
    pub color: Color,
    pub start_depth: f32,
    pub end_depth: f32,
}

impl Decode for CndFog {
    fn decode<S: Stream + ?Sized>(stream: &mut S) -> Result<Self> {
        Ok(Self {
            enabled: stream.read_i32()?,
            color: Color::decode(stream)?,
            start_depth: stream.read_f32()?,
            end_depth: stream.read_f32()?,
        })
    }
}

impl Encode for CndFog {
    fn encode<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<()> {
        stream.write_i32(self.enabled)?;
        self.color.encode(stream)?;
        stream.write_f32(self.start_depth)?;
        stream.write_f32(self.end_depth)
    }
}

/// The fixed 1568-byte header record, field order exactly as serialized.
///
/// Fields prefixed `a_` (and the `unknown*` words) are legacy in-engine
/// pointer slots; they carry no meaning after deserialization but are
/// preserved verbatim so a parse-then-write round trip is byte-exact.
/// Freshly built headers leave them zero.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CndHeader {
    pub file_size: u32,
    pub copyright: FixedString<1216>,
    pub file_path: FixedString<64>,
    pub file_type: u32,
    pub version: u32,
    pub world_gravity: f32,
    pub ceiling_sky_z: f32,
    pub horizon_distance: f32,
    pub horizon_sky_offset: Vector2f,
    pub ceiling_sky_offset: Vector2f,
    pub lod_distances: Vector4f,
    pub fog: CndFog,

    pub num_sounds: u32,

    pub num_materials: u32,
    pub size_materials: u32,
    pub a_materials: u32,
    pub ap_mat_array: u32,

    pub num_vertices: u32,
    pub a_vertices: u32,
    pub unknown28: u32,
    pub unknown29: u32,

    pub num_tex_vertices: u32,
    pub a_tex_vertices: u32,
    pub unknown32: u32,
    pub unknown33: u32,

    pub num_adjoins: u32,
    pub a_adjoins: u32,

    pub num_surfaces: u32,
    pub a_surfaces: u32,

    pub num_sectors: u32,
    pub a_sectors: u32,

    pub num_ai_classes: u32,
    pub size_ai_classes: u32,
    pub a_ai_classes: u32,

    pub num_models: u32,
    pub size_models: u32,
    pub a_models: u32,

    pub num_sprites: u32,
    pub size_sprites: u32,
    pub a_sprites: u32,

    pub num_keyframes: u32,
    pub size_keyframes: u32,
    pub a_keyframes: u32,

    pub num_puppets: u32,
    pub size_puppets: u32,
    pub a_puppets: u32,

    pub num_sound_classes: u32,
    pub size_sound_classes: u32,
    pub a_sound_classes: u32,

    pub num_cog_scripts: u32,
    pub size_cog_scripts: u32,
    pub a_cog_scripts: u32,

    pub num_cogs: u32,
    pub size_cogs: u32,
    pub a_cogs: u32,

    pub num_thing_templates: u32,
    pub size_thing_templates: u32,
    pub a_thing_templates: u32,

    pub num_things: u32,
    pub size_things: u32,
    pub a_things: u32,

    pub pvs_size: u32,
    pub a_pvs: u32,
}

impl CndHeader {
    /// Read the header at the stream's current position.
    pub fn read<S: Stream + ?Sized>(stream: &mut S) -> Result<Self> {
        Ok(Self {
            file_size: stream.read_u32()?,
            copyright: FixedString::decode(stream)?,
            file_path: FixedString::decode(stream)?,
            file_type: stream.read_u32()?,
            version: stream.read_u32()?,
            world_gravity: stream.read_f32()?,
            ceiling_sky_z: stream.read_f32()?,
            horizon_distance: stream.read_f32()?,
            horizon_sky_offset: Vector2f::decode(stream)?,
            ceiling_sky_offset: Vector2f::decode(stream)?,
            lod_distances: Vector4f::decode(stream)?,
            fog: CndFog::decode(stream)?,

            num_sounds: stream.read_u32()?,

            num_materials: stream.read_u32()?,
            size_materials: stream.read_u32()?,
            a_materials: stream.read_u32()?,
            ap_mat_array: stream.read_u32()?,

            num_vertices: stream.read_u32()?,
            a_vertices: stream.read_u32()?,
            unknown28: stream.read_u32()?,
            unknown29: stream.read_u32()?,

            num_tex_vertices: stream.read_u32()?,
            a_tex_vertices: stream.read_u32()?,
            unknown32: stream.read_u32()?,
            unknown33: stream.read_u32()?,

            num_adjoins: stream.read_u32()?,
            a_adjoins: stream.read_u32()?,

            num_surfaces: stream.read_u32()?,
            a_surfaces: stream.read_u32()?,

            num_sectors: stream.read_u32()?,
            a_sectors: stream.read_u32()?,

            num_ai_classes: stream.read_u32()?,
            size_ai_classes: stream.read_u32()?,
            a_ai_classes: stream.read_u32()?,

            num_models: stream.read_u32()?,
            size_models: stream.read_u32()?,
            a_models: stream.read_u32()?,

            num_sprites: stream.read_u32()?,
            size_sprites: stream.read_u32()?,
            a_sprites: stream.read_u32()?,

            num_keyframes: stream.read_u32()?,
            size_keyframes: stream.read_u32()?,
            a_keyframes: stream.read_u32()?,

            num_puppets: stream.read_u32()?,
            size_puppets: stream.read_u32()?,
            a_puppets: stream.read_u32()?,

            num_sound_classes: stream.read_u32()?,
            size_sound_classes: stream.read_u32()?,
            a_sound_classes: stream.read_u32()?,

            num_cog_scripts: stream.read_u32()?,
            size_cog_scripts: stream.read_u32()?,
            a_cog_scripts: stream.read_u32()?,

            num_cogs: stream.read_u32()?,
            size_cogs: stream.read_u32()?,
            a_cogs: stream.read_u32()?,

            num_thing_templates: stream.read_u32()?,
            size_thing_templates: stream.read_u32()?,
            a_thing_templates: stream.read_u32()?,

            num_things: stream.read_u32()?,
            size_things: stream.read_u32()?,
            a_things: stream.read_u32()?,

            pvs_size: stream.read_u32()?,
            a_pvs: stream.read_u32()?,
        })
    }

    /// Write the header verbatim at the stream's current position.
    pub fn write<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<()> {
        stream.write_u32(self.file_size)?;
        self.copyright.encode(stream)?;
        self.file_path.encode(stream)?;
        stream.write_u32(self.file_type)?;
        stream.write_u32(self.version)?;
        stream.write_f32(self.world_gravity)?;
        stream.write_f32(self.ceiling_sky_z)?;
        stream.write_f32(self.horizon_distance)?;
        self.horizon_sky_offset.encode(stream)?;
        self.ceiling_sky_offset.encode(stream)?;
        self.lod_distances.encode(stream)?;
        self.fog.encode(stream)?;

        stream.write_u32(self.num_sounds)?;

        stream.write_u32(self.num_materials)?;
        stream.write_u32(self.size_materials)?;
        stream.write_u32(self.a_materials)?;
        stream.write_u32(self.ap_mat_array)?;

        stream.write_u32(self.num_vertices)?;
        stream.write_u32(self.a_vertices)?;
        stream.write_u32(self.unknown28)?;
        stream.write_u32(self.unknown29)?;

        stream.write_u32(self.num_tex_vertices)?;
        stream.write_u32(self.a_tex_vertices)?;
        stream.write_u32(self.unknown32)?;
        stream.write_u32(self.unknown33)?;

        stream.write_u32(self.num_adjoins)?;
        stream.write_u32(self.a_adjoins)?;

        stream.write_u32(self.num_surfaces)?;
        stream.write_u32(self.a_surfaces)?;

        stream.write_u32(self.num_sectors)?;
        stream.write_u32(self.a_sectors)?;

        stream.write_u32(self.num_ai_classes)?;
        stream.write_u32(self.size_ai_classes)?;
        stream.write_u32(self.a_ai_classes)?;

        stream.write_u32(self.num_models)?;
        stream.write_u32(self.size_models)?;
        stream.write_u32(self.a_models)?;

        stream.write_u32(self.num_sprites)?;
        stream.write_u32(self.size_sprites)?;
        stream.write_u32(self.a_sprites)?;

        stream.write_u32(self.num_keyframes)?;
        stream.write_u32(self.size_keyframes)?;
        stream.write_u32(self.a_keyframes)?;

        stream.write_u32(self.num_puppets)?;
        stream.write_u32(self.size_puppets)?;
        stream.write_u32(self.a_puppets)?;

        stream.write_u32(self.num_sound_classes)?;
        stream.write_u32(self.size_sound_classes)?;
        stream.write_u32(self.a_sound_classes)?;

        stream.write_u32(self.num_cog_scripts)?;
        stream.write_u32(self.size_cog_scripts)?;
        stream.write_u32(self.a_cog_scripts)?;

        stream.write_u32(self.num_cogs)?;
        stream.write_u32(self.size_cogs)?;
        stream.write_u32(self.a_cogs)?;

        stream.write_u32(self.num_thing_templates)?;
        stream.write_u32(self.size_thing_templates)?;
        stream.write_u32(self.a_thing_templates)?;

        stream.write_u32(self.num_things)?;
        stream.write_u32(self.size_things)?;
        stream.write_u32(self.a_things)?;

        stream.write_u32(self.pvs_size)?;
        stream.write_u32(self.a_pvs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{MemoryStream, Stream};

    #[test]
    fn serialized_header_is_exactly_header_size() {
        let mut s = MemoryStream::new();
        CndHeader::default().write(&mut s).unwrap();
        assert_eq!(s.len(), HEADER_SIZE);
    }

    #[test]
    fn header_round_trips() {
        let header = CndHeader {
            file_size: 123_456,
            copyright: FixedString::new("(c) example").unwrap(),
            file_path: FixedString::new("resource\\ndy\\test.cnd").unwrap(),
            file_type: FILE_TYPE_WORLD,
            version: 3,
            world_gravity: 4.0,
            num_materials: 7,
            size_materials: 4096,
            a_materials: 0xDEAD_BEEF, // placeholders survive verbatim
            num_sectors: 12,
            pvs_size: 256,
            ..Default::default()
        };

        let mut s = MemoryStream::new();
        header.write(&mut s).unwrap();
        s.seek(0).unwrap();
        let back = CndHeader::read(&mut s).unwrap();
        assert_eq!(back, header);
        assert_eq!(s.tell(), HEADER_SIZE);
    }
}
