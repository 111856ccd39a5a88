//! Name-list sections: flat tables of 64-byte resource names.
//!
//! Six sections share this layout: AI classes, models, sprites, anim
//! classes (the header calls them puppets), sound classes and cog scripts.
//! They differ only in which header fields size them and where they sit in
//! the additive offset chain, so one codec serves all six, parameterized by
//! section identity.

use crate::codec::{CndName, StreamExt};
use crate::error::{Error, Result};
use crate::header::CndHeader;
use crate::sections::{keyframes, sectors};
use crate::stream::Stream;

/// Bytes per name entry.
pub const NAME_SIZE: u64 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSection {
    AiClass,
    Models,
    Sprites,
    AnimClass,
    SoundClass,
    CogScript,
}

impl NameSection {
    /// Section identity used in decode errors.
    pub const fn name(self) -> &'static str {
        match self {
            NameSection::AiClass => "aiclasses",
            NameSection::Models => "models",
            NameSection::Sprites => "sprites",
            NameSection::AnimClass => "animclasses",
            NameSection::SoundClass => "soundclasses",
            NameSection::CogScript => "cogscripts",
        }
    }

    pub fn count(self, header: &CndHeader) -> u32 {
        match self {
            NameSection::AiClass => header.num_ai_classes,
            NameSection::Models => header.num_models,
            NameSection::Sprites => header.num_sprites,
            NameSection::AnimClass => header.num_puppets,
            NameSection::SoundClass => header.num_sound_classes,
            NameSection::CogScript => header.num_cog_scripts,
        }
    }

    pub fn declared_size(self, header: &CndHeader) -> u32 {
        match self {
            NameSection::AiClass => header.size_ai_classes,
            NameSection::Models => header.size_models,
            NameSection::Sprites => header.size_sprites,
            NameSection::AnimClass => header.size_puppets,
            NameSection::SoundClass => header.size_sound_classes,
            NameSection::CogScript => header.size_cog_scripts,
        }
    }

    /// Additive offset over all preceding sections.
    pub fn offset(self, header: &CndHeader) -> u64 {
        match self {
            NameSection::AiClass => sectors::offset(header) + sectors::declared_size(header),
            NameSection::Models => {
                NameSection::AiClass.offset(header) + header.size_ai_classes as u64
            }
            NameSection::Sprites => {
                NameSection::Models.offset(header) + header.size_models as u64
            }
            // Keyframes sit between sprites and the anim class table.
            NameSection::AnimClass => {
                keyframes::offset(header) + header.size_keyframes as u64
            }
            NameSection::SoundClass => {
                NameSection::AnimClass.offset(header) + header.size_puppets as u64
            }
            NameSection::CogScript => {
                NameSection::SoundClass.offset(header) + header.size_sound_classes as u64
            }
        }
    }

    pub fn parse<S: Stream + ?Sized>(
        self,
        stream: &mut S,
        header: &CndHeader,
    ) -> Result<Vec<CndName>> {
        let start = stream.tell();
        self.parse_inner(stream, header, start)
            .map_err(|e| e.into_section(self.name(), start))
    }

    fn parse_inner<S: Stream + ?Sized>(
        self,
        stream: &mut S,
        header: &CndHeader,
        start: u64,
    ) -> Result<Vec<CndName>> {
        let count = self.count(header) as u64;
        let declared = self.declared_size(header) as u64;
        if declared != count * NAME_SIZE {
            return Err(Error::section(
                self.name(),
                start,
                format!("{count} names need {} bytes, header declares {declared}", count * NAME_SIZE),
            ));
        }
        if start + declared > stream.len() {
            return Err(Error::section(
                self.name(),
                start,
                format!("declared size {declared} exceeds the stream"),
            ));
        }
        stream.read_seq(count as usize)
    }

    pub fn read<S: Stream + ?Sized>(self, stream: &mut S) -> Result<Vec<CndName>> {
        stream.seek(0)?;
        let header = CndHeader::read(stream)?;
        stream.seek(self.offset(&header))?;
        self.parse(stream, &header)
    }

    pub fn write<S: Stream + ?Sized>(self, stream: &mut S, names: &[CndName]) -> Result<()> {
        stream.write_seq(names)
    }

    pub fn byte_size(names: &[CndName]) -> u64 {
        names.len() as u64 * NAME_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::MemoryStream;

    #[test]
    fn size_count_mismatch_is_a_decode_error() {
        let header = CndHeader {
            num_models: 3,
            size_models: 100, // should be 192
            ..Default::default()
        };
        let mut s = MemoryStream::from_vec(vec![0; 4096]);
        match NameSection::Models.parse(&mut s, &header) {
            Err(Error::SectionDecode { section, .. }) => assert_eq!(section, "models"),
            other => panic!("expected section-decode error, got {other:?}"),
        }
    }

    #[test]
    fn names_round_trip_in_order() {
        let names = vec![
            CndName::new("ranger.ai").unwrap(),
            CndName::new("mole.ai").unwrap(),
        ];
        let mut s = MemoryStream::new();
        NameSection::AiClass.write(&mut s, &names).unwrap();
        assert_eq!(s.len(), 128);

        let header = CndHeader {
            num_ai_classes: 2,
            size_ai_classes: 128,
            ..Default::default()
        };
        s.seek(0).unwrap();
        let back = NameSection::AiClass.parse(&mut s, &header).unwrap();
        assert_eq!(back, names);
    }
}
