//! RIFF/WAV codec: a second, independent user of the [`Stream`] contract.
//!
//! A leaf tag+size+payload chunk format with no coupling to the container
//! header model. Unknown chunks are skipped; `fmt ` and `data` are required.

use crate::codec::StreamExt;
use crate::error::{Error, Result};
use crate::stream::Stream;

const RIFF_TAG: [u8; 4] = *b"RIFF";
const WAVE_TAG: [u8; 4] = *b"WAVE";
const FMT_TAG: [u8; 4] = *b"fmt ";
const DATA_TAG: [u8; 4] = *b"data";

/// Uncompressed PCM, the only format the engine ships.
pub const FORMAT_LPCM: u16 = 1;

const SECTION: &str = "wav";
const FMT_CHUNK_SIZE: u32 = 16;

/// Contents of the `fmt ` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WavFmt {
    pub audio_format: u16,
    pub num_channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
}

/// A decoded WAV file: format descriptor plus raw sample payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Wav {
    pub fmt: WavFmt,
    pub data: Vec<u8>,
}

impl Wav {
    /// Read a RIFF/WAVE file from the stream's current position.
    pub fn read<S: Stream + ?Sized>(stream: &mut S) -> Result<Self> {
        let tag = stream.read_tag()?;
        if tag != RIFF_TAG {
            return Err(Error::InvalidMagic {
                expected: RIFF_TAG,
                found: tag,
            });
        }
        let riff_size = stream.read_u32()? as u64;
        let riff_end = stream.tell() + riff_size;

        let form = stream.read_tag()?;
        if form != WAVE_TAG {
            return Err(Error::InvalidMagic {
                expected: WAVE_TAG,
                found: form,
            });
        }

        let mut fmt = None;
        let mut data = None;
        while stream.tell() < riff_end && (fmt.is_none() || data.is_none()) {
            let chunk_at = stream.tell();
            let tag = stream.read_tag()?;
            let size = stream.read_u32()?;
            match tag {
                FMT_TAG => {
                    if size < FMT_CHUNK_SIZE {
                        return Err(Error::section(
                            SECTION,
                            chunk_at,
                            format!("fmt chunk of {size} bytes, expected at least {FMT_CHUNK_SIZE}"),
                        ));
                    }
                    fmt = Some(WavFmt {
                        audio_format: stream.read_u16()?,
                        num_channels: stream.read_u16()?,
                        sample_rate: stream.read_u32()?,
                        byte_rate: stream.read_u32()?,
                        block_align: stream.read_u16()?,
                        bits_per_sample: stream.read_u16()?,
                    });
                    // Extension bytes of an oversized fmt chunk are skipped.
                    stream.seek(chunk_at + 8 + size as u64)?;
                }
                DATA_TAG => {
                    data = Some(
                        stream
                            .read_buf(size as usize)
                            .map_err(|e| e.into_section(SECTION, chunk_at))?,
                    );
                    if size & 1 == 1 {
                        stream.seek(stream.tell() + 1)?;
                    }
                }
                _ => {
                    // Unknown chunk: skip payload plus the odd-size pad byte.
                    stream.seek(chunk_at + 8 + size as u64 + (size as u64 & 1))?;
                }
            }
        }

        let fmt = fmt.ok_or_else(|| Error::section(SECTION, riff_end, "missing fmt chunk"))?;
        let data = data.ok_or_else(|| Error::section(SECTION, riff_end, "missing data chunk"))?;
        Ok(Self { fmt, data })
    }

    /// Write a RIFF/WAVE file at the stream's current position.
    pub fn write<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<()> {
        let data_size = self.data.len() as u32;
        // WAVE form + fmt chunk + data chunk (with pad byte for odd sizes).
        let riff_size = 4 + (8 + FMT_CHUNK_SIZE) + (8 + data_size + (data_size & 1));

        stream.write_tag(&RIFF_TAG)?;
        stream.write_u32(riff_size)?;
        stream.write_tag(&WAVE_TAG)?;

        stream.write_tag(&FMT_TAG)?;
        stream.write_u32(FMT_CHUNK_SIZE)?;
        stream.write_u16(self.fmt.audio_format)?;
        stream.write_u16(self.fmt.num_channels)?;
        stream.write_u32(self.fmt.sample_rate)?;
        stream.write_u32(self.fmt.byte_rate)?;
        stream.write_u16(self.fmt.block_align)?;
        stream.write_u16(self.fmt.bits_per_sample)?;

        stream.write_tag(&DATA_TAG)?;
        stream.write_u32(data_size)?;
        stream.write_buf(&self.data)?;
        if data_size & 1 == 1 {
            stream.write_u8(0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::MemoryStream;

    fn sample() -> Wav {
        Wav {
            fmt: WavFmt {
                audio_format: FORMAT_LPCM,
                num_channels: 1,
                sample_rate: 22_050,
                byte_rate: 44_100,
                block_align: 2,
                bits_per_sample: 16,
            },
            data: vec![0x10, 0x20, 0x30, 0x40],
        }
    }

    #[test]
    fn wav_round_trips() {
        let wav = sample();
        let mut s = MemoryStream::new();
        wav.write(&mut s).unwrap();

        s.seek(0).unwrap();
        let back = Wav::read(&mut s).unwrap();
        assert_eq!(back, wav);
    }

    #[test]
    fn odd_data_is_padded() {
        let mut wav = sample();
        wav.data = vec![1, 2, 3];
        let mut s = MemoryStream::new();
        wav.write(&mut s).unwrap();
        // 12-byte RIFF/WAVE header + 24-byte fmt + 8-byte data header + 3 + pad.
        assert_eq!(s.len(), 12 + 24 + 8 + 4);

        s.seek(0).unwrap();
        assert_eq!(Wav::read(&mut s).unwrap(), wav);
    }

    #[test]
    fn unknown_chunks_are_skipped() {
        let wav = sample();
        let mut s = MemoryStream::new();
        // RIFF envelope containing LIST + fmt + data.
        s.write_tag(&RIFF_TAG).unwrap();
        s.write_u32(0).unwrap(); // backpatched below
        s.write_tag(&WAVE_TAG).unwrap();
        s.write_tag(b"LIST").unwrap();
        s.write_u32(6).unwrap();
        s.write_buf(&[0; 6]).unwrap();
        let fmt_and_data = {
            let mut inner = MemoryStream::new();
            wav.write(&mut inner).unwrap();
            inner.into_inner()[12..].to_vec()
        };
        s.write_buf(&fmt_and_data).unwrap();
        let total = s.len();
        s.seek(4).unwrap();
        s.write_u32((total - 8) as u32).unwrap();

        s.seek(0).unwrap();
        assert_eq!(Wav::read(&mut s).unwrap(), wav);
    }

    #[test]
    fn missing_fmt_is_a_decode_error() {
        let mut s = MemoryStream::new();
        s.write_tag(&RIFF_TAG).unwrap();
        s.write_u32(4).unwrap();
        s.write_tag(&WAVE_TAG).unwrap();

        s.seek(0).unwrap();
        match Wav::read(&mut s) {
            Err(Error::SectionDecode { section, .. }) => assert_eq!(section, "wav"),
            other => panic!("expected section-decode error, got {other:?}"),
        }
    }

    #[test]
    fn non_riff_input_is_rejected() {
        let mut s = MemoryStream::from_vec(b"OggS\0\0\0\0".to_vec());
        assert!(matches!(Wav::read(&mut s), Err(Error::InvalidMagic { .. })));
    }
}
