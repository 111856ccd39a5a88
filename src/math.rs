//! POD vector and color types that appear verbatim in the wire format.

use crate::codec::{Decode, Encode};
use crate::error::Result;
use crate::stream::Stream;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2f {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3f {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector4f {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

/// RGBA color with float components, stored as four consecutive f32.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Vector2f {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Vector3f {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl Vector4f {
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

macro_rules! impl_pod_codec {
    ($ty:ty { $($field:ident),+ }) => {
        impl Decode for $ty {
            fn decode<S: Stream + ?Sized>(stream: &mut S) -> Result<Self> {
                Ok(Self {
                    $($field: f32::decode(stream)?,)+
                })
            }
        }

        impl Encode for $ty {
            fn encode<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<()> {
                $(self.$field.encode(stream)?;)+
                Ok(())
            }
        }
    };
}

impl_pod_codec!(Vector2f { x, y });
impl_pod_codec!(Vector3f { x, y, z });
impl_pod_codec!(Vector4f { x, y, z, w });
impl_pod_codec!(Color { r, g, b, a });
