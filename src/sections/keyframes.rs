//! Keyframes section: named animations, each a set of markers plus
//! per-node channels of time-stamped transforms.
//!
//! Variable-length records, so the section is located and bounded by the
//! header's `size_keyframes` field. Keyed by animation name; map order is
//! file order.

use indexmap::IndexMap;

use crate::codec::{CndName, Decode, Encode, StreamExt};
use crate::error::{Error, Result};
use crate::header::CndHeader;
use crate::math::Vector3f;
use crate::sections::names::NameSection;
use crate::stream::Stream;

pub const SECTION: &str = "keyframes";

/// Fixed part of an animation record: 64-byte name + six u32/f32 fields.
const RECORD_HEADER_SIZE: u64 = 64 + 24;
const MARKER_SIZE: u64 = 8;
const NODE_HEADER_SIZE: u64 = 8;
const ENTRY_SIZE: u64 = 56;

/// A timeline marker: an event tag pinned to a frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KeyMarker {
    pub frame: f32,
    pub kind: u32,
}

impl Decode for KeyMarker {
    fn decode<S: Stream + ?Sized>(stream: &mut S) -> Result<Self> {
        Ok(Self {
            frame: stream.read_f32()?,
            kind: stream.read_u32()?,
        })
    }
}

impl Encode for KeyMarker {
    fn encode<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<()> {
        stream.write_f32(self.frame)?;
        stream.write_u32(self.kind)
    }
}

/// One keyframe on a node's channel: a transform and its first derivative.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KeyNodeEntry {
    pub frame: f32,
    pub flags: u32,
    pub position: Vector3f,
    pub orientation: Vector3f,
    pub delta_position: Vector3f,
    pub delta_orientation: Vector3f,
}

impl Decode for KeyNodeEntry {
    fn decode<S: Stream + ?Sized>(stream: &mut S) -> Result<Self> {
        Ok(Self {
            frame: stream.read_f32()?,
            flags: stream.read_u32()?,
            position: Vector3f::decode(stream)?,
            orientation: Vector3f::decode(stream)?,
            delta_position: Vector3f::decode(stream)?,
            delta_orientation: Vector3f::decode(stream)?,
        })
    }
}

impl Encode for KeyNodeEntry {
    fn encode<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<()> {
        stream.write_f32(self.frame)?;
        stream.write_u32(self.flags)?;
        self.position.encode(stream)?;
        self.orientation.encode(stream)?;
        self.delta_position.encode(stream)?;
        self.delta_orientation.encode(stream)
    }
}

/// Animation channel for a single skeleton node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeyNode {
    pub node_id: u32,
    pub entries: Vec<KeyNodeEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub name: CndName,
    pub flags: u32,
    pub kind: u32,
    pub frame_count: u32,
    pub fps: f32,
    pub markers: Vec<KeyMarker>,
    pub nodes: Vec<KeyNode>,
}

impl Animation {
    /// Serialized length of this record.
    pub fn record_size(&self) -> u64 {
        RECORD_HEADER_SIZE
            + self.markers.len() as u64 * MARKER_SIZE
            + self
                .nodes
                .iter()
                .map(|n| NODE_HEADER_SIZE + n.entries.len() as u64 * ENTRY_SIZE)
                .sum::<u64>()
    }
}

/// Animations keyed by name, iteration in file order.
pub type AnimationMap = IndexMap<String, Animation>;

pub fn offset(header: &CndHeader) -> u64 {
    NameSection::Sprites.offset(header) + header.size_sprites as u64
}

pub fn parse<S: Stream + ?Sized>(stream: &mut S, header: &CndHeader) -> Result<AnimationMap> {
    let start = stream.tell();
    parse_inner(stream, header, start).map_err(|e| e.into_section(SECTION, start))
}

fn parse_inner<S: Stream + ?Sized>(
    stream: &mut S,
    header: &CndHeader,
    start: u64,
) -> Result<AnimationMap> {
    let declared = header.size_keyframes as u64;
    let count = header.num_keyframes as u64;
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

    let mut animations = AnimationMap::with_capacity(header.num_keyframes as usize);
    for _ in 0..header.num_keyframes {
        let record_at = stream.tell();
        let name = CndName::decode(stream)?;
        let flags = stream.read_u32()?;
        let kind = stream.read_u32()?;
        let frame_count = stream.read_u32()?;
        let fps = stream.read_f32()?;
        let marker_count = stream.read_u32()?;
        let node_count = stream.read_u32()?;

        ensure_fits(stream, end, marker_count as u64 * MARKER_SIZE, record_at)?;
        let markers: Vec<KeyMarker> = stream.read_seq(marker_count as usize)?;

        ensure_fits(stream, end, node_count as u64 * NODE_HEADER_SIZE, record_at)?;
        let mut nodes = Vec::with_capacity(node_count as usize);
        for _ in 0..node_count {
            let node_id = stream.read_u32()?;
            let entry_count = stream.read_u32()?;
            ensure_fits(stream, end, entry_count as u64 * ENTRY_SIZE, record_at)?;
            let entries: Vec<KeyNodeEntry> = stream.read_seq(entry_count as usize)?;
            nodes.push(KeyNode { node_id, entries });
        }

        let key = name.as_str().to_owned();
        let animation = Animation {
            name,
            flags,
            kind,
            frame_count,
            fps,
            markers,
            nodes,
        };
        if animations.insert(key.clone(), animation).is_some() {
            return Err(Error::section(
                SECTION,
                record_at,
                format!("duplicate animation name {key:?}"),
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
    Ok(animations)
}

fn ensure_fits<S: Stream + ?Sized>(
    stream: &S,
    end: u64,
    needed: u64,
    record_at: u64,
) -> Result<()> {
    if stream.tell() + needed > end {
        return Err(Error::section(
            SECTION,
            record_at,
            format!("{needed}-byte sub-record overruns the declared section size"),
        ));
    }
    Ok(())
}

pub fn read<S: Stream + ?Sized>(stream: &mut S) -> Result<AnimationMap> {
    stream.seek(0)?;
    let header = CndHeader::read(stream)?;
    stream.seek(offset(&header))?;
    parse(stream, &header)
}

pub fn write<S: Stream + ?Sized>(stream: &mut S, animations: &AnimationMap) -> Result<()> {
    for animation in animations.values() {
        animation.name.encode(stream)?;
        stream.write_u32(animation.flags)?;
        stream.write_u32(animation.kind)?;
        stream.write_u32(animation.frame_count)?;
        stream.write_f32(animation.fps)?;
        stream.write_u32(animation.markers.len() as u32)?;
        stream.write_u32(animation.nodes.len() as u32)?;
        stream.write_seq(&animation.markers)?;
        for node in &animation.nodes {
            stream.write_u32(node.node_id)?;
            stream.write_u32(node.entries.len() as u32)?;
            stream.write_seq(&node.entries)?;
        }
    }
    Ok(())
}

pub fn byte_size(animations: &AnimationMap) -> u64 {
    animations.values().map(Animation::record_size).sum()
}
