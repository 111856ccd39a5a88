//! High-level container type: a fully parsed CND world.
//!
//! [`CndWorld::read`] decodes the header and every section in file order;
//! [`CndWorld::write`] recomputes all header `size`/`count` fields from the
//! collections and serializes the whole container, so a parse-then-write of
//! a well-formed file reproduces the input bytes.

use tracing::debug;

use crate::codec::{CndName, StreamExt};
use crate::error::{Error, Result};
use crate::header::{CndHeader, HEADER_SIZE};
use crate::sections::georesource::{self, Georesource};
use crate::sections::keyframes::{self, AnimationMap};
use crate::sections::materials::{self, Material, MaterialMap};
use crate::sections::names::NameSection;
use crate::sections::sectors::{self, Sector};
use crate::stream::Stream;

/// A trailing section kept as opaque bytes. The element count from the
/// header is carried through so it can be written back.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawSection {
    pub count: u32,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CndWorld {
    /// Header scalars (world physics, fog, sky). The `size`/`count` fields
    /// are whatever was last read; `write` recomputes them.
    pub header: CndHeader,
    pub materials: MaterialMap,
    pub georesource: Georesource,
    pub sectors: Vec<Sector>,
    pub ai_classes: Vec<CndName>,
    pub models: Vec<CndName>,
    pub sprites: Vec<CndName>,
    pub keyframes: AnimationMap,
    pub anim_classes: Vec<CndName>,
    pub sound_classes: Vec<CndName>,
    pub cog_scripts: Vec<CndName>,
    pub cogs: RawSection,
    pub thing_templates: RawSection,
    pub things: RawSection,
    /// Potentially-visible-set table, opaque.
    pub pvs: Vec<u8>,
}

impl CndWorld {
    /// Parse a whole container from the start of the stream.
    pub fn read<S: Stream + ?Sized>(stream: &mut S) -> Result<Self> {
        stream.seek(0)?;
        let header = CndHeader::read(stream)?;
        debug!(
            file_type = header.file_type,
            version = header.version,
            file_size = header.file_size,
            "reading CND container"
        );

        stream.seek(materials::offset(&header))?;
        let materials = materials::parse(stream, &header)?;

        stream.seek(georesource::offset(&header))?;
        let georesource = georesource::parse(stream, &header)?;

        stream.seek(sectors::offset(&header))?;
        let sectors = sectors::parse(stream, &header)?;

        stream.seek(NameSection::AiClass.offset(&header))?;
        let ai_classes = NameSection::AiClass.parse(stream, &header)?;
        stream.seek(NameSection::Models.offset(&header))?;
        let models = NameSection::Models.parse(stream, &header)?;
        stream.seek(NameSection::Sprites.offset(&header))?;
        let sprites = NameSection::Sprites.parse(stream, &header)?;

        stream.seek(keyframes::offset(&header))?;
        let keyframes = keyframes::parse(stream, &header)?;

        stream.seek(NameSection::AnimClass.offset(&header))?;
        let anim_classes = NameSection::AnimClass.parse(stream, &header)?;
        stream.seek(NameSection::SoundClass.offset(&header))?;
        let sound_classes = NameSection::SoundClass.parse(stream, &header)?;
        stream.seek(NameSection::CogScript.offset(&header))?;
        let cog_scripts = NameSection::CogScript.parse(stream, &header)?;

        // Trailing sections are opaque; the stream is already positioned
        // right after the cog script table.
        let cogs = read_raw(stream, header.num_cogs, header.size_cogs, "cogs")?;
        let thing_templates = read_raw(
            stream,
            header.num_thing_templates,
            header.size_thing_templates,
            "thingtemplates",
        )?;
        let things = read_raw(stream, header.num_things, header.size_things, "things")?;

        let pvs_at = stream.tell();
        let pvs = stream
            .read_buf(header.pvs_size as usize)
            .map_err(|e| e.into_section("pvs", pvs_at))?;

        let end = stream.tell();
        if header.file_size as u64 != end {
            return Err(Error::section(
                "header",
                0,
                format!("file size field is {}, container occupies {end} bytes", header.file_size),
            ));
        }
        debug!(bytes = end, "CND container read");

        Ok(Self {
            header,
            materials,
            georesource,
            sectors,
            ai_classes,
            models,
            sprites,
            keyframes,
            anim_classes,
            sound_classes,
            cog_scripts,
            cogs,
            thing_templates,
            things,
            pvs,
        })
    }

    /// Serialize the whole container from the start of the stream, header
    /// `size`/`count` fields recomputed from the collections.
    pub fn write<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<()> {
        let header = self.recompute_header();
        debug!(
            file_size = header.file_size,
            materials = header.num_materials,
            sectors = header.num_sectors,
            "writing CND container"
        );

        stream.seek(0)?;
        header.write(stream)?;
        materials::write(stream, &self.materials)?;
        georesource::write(stream, &self.georesource)?;
        sectors::write(stream, &self.sectors)?;
        NameSection::AiClass.write(stream, &self.ai_classes)?;
        NameSection::Models.write(stream, &self.models)?;
        NameSection::Sprites.write(stream, &self.sprites)?;
        keyframes::write(stream, &self.keyframes)?;
        NameSection::AnimClass.write(stream, &self.anim_classes)?;
        NameSection::SoundClass.write(stream, &self.sound_classes)?;
        NameSection::CogScript.write(stream, &self.cog_scripts)?;
        stream.write_buf(&self.cogs.data)?;
        stream.write_buf(&self.thing_templates.data)?;
        stream.write_buf(&self.things.data)?;
        stream.write_buf(&self.pvs)?;
        Ok(())
    }

    /// Header with every `size`/`count` field (and the total file size)
    /// recomputed from the in-memory collections. Placeholder fields and
    /// world scalars are carried over unchanged.
    pub fn recompute_header(&self) -> CndHeader {
        let mut header = self.header.clone();

        header.num_materials = self.materials.len() as u32;
        header.size_materials = materials::byte_size(&self.materials) as u32;

        header.num_vertices = self.georesource.vertices.len() as u32;
        header.num_tex_vertices = self.georesource.tex_vertices.len() as u32;
        header.num_adjoins = self.georesource.adjoins.len() as u32;
        header.num_surfaces = self.georesource.surfaces.len() as u32;

        header.num_sectors = self.sectors.len() as u32;

        header.num_ai_classes = self.ai_classes.len() as u32;
        header.size_ai_classes = NameSection::byte_size(&self.ai_classes) as u32;
        header.num_models = self.models.len() as u32;
        header.size_models = NameSection::byte_size(&self.models) as u32;
        header.num_sprites = self.sprites.len() as u32;
        header.size_sprites = NameSection::byte_size(&self.sprites) as u32;

        header.num_keyframes = self.keyframes.len() as u32;
        header.size_keyframes = keyframes::byte_size(&self.keyframes) as u32;

        header.num_puppets = self.anim_classes.len() as u32;
        header.size_puppets = NameSection::byte_size(&self.anim_classes) as u32;
        header.num_sound_classes = self.sound_classes.len() as u32;
        header.size_sound_classes = NameSection::byte_size(&self.sound_classes) as u32;
        header.num_cog_scripts = self.cog_scripts.len() as u32;
        header.size_cog_scripts = NameSection::byte_size(&self.cog_scripts) as u32;

        header.num_cogs = self.cogs.count;
        header.size_cogs = self.cogs.data.len() as u32;
        header.num_thing_templates = self.thing_templates.count;
        header.size_thing_templates = self.thing_templates.data.len() as u32;
        header.num_things = self.things.count;
        header.size_things = self.things.data.len() as u32;
        header.pvs_size = self.pvs.len() as u32;

        header.file_size = (HEADER_SIZE
            + header.size_materials as u64
            + georesource::byte_size(&self.georesource)
            + sectors::byte_size(&self.sectors)
            + header.size_ai_classes as u64
            + header.size_models as u64
            + header.size_sprites as u64
            + header.size_keyframes as u64
            + header.size_puppets as u64
            + header.size_sound_classes as u64
            + header.size_cog_scripts as u64
            + header.size_cogs as u64
            + header.size_thing_templates as u64
            + header.size_things as u64
            + header.pvs_size as u64) as u32;

        header
    }

    /// Swap a material in place by name, keeping its position in the keyed
    /// order. Returns whether a material of that name existed.
    pub fn replace_material(&mut self, material: Material) -> bool {
        match self.materials.get_mut(material.name.as_str()) {
            Some(slot) => {
                *slot = material;
                true
            }
            None => false,
        }
    }
}

fn read_raw<S: Stream + ?Sized>(
    stream: &mut S,
    count: u32,
    size: u32,
    section: &'static str,
) -> Result<RawSection> {
    let at = stream.tell();
    let data = stream
        .read_buf(size as usize)
        .map_err(|e| e.into_section(section, at))?;
    Ok(RawSection { count, data })
}
