//! Item identity and stack state.
//!
//! The authoritative side captures an [`ItemStack`] into an [`ItemRef`]
//! (code + serialized stack bytes). Observers decode the bytes back into an
//! identical stack to pick the right mesh variant.

use std::fmt;

use crate::codec::{ByteReader, ByteWriter};
use crate::error::{SharedError, SharedResult};

/// Domain assumed when a code has no `domain:` prefix.
pub const DEFAULT_DOMAIN: &str = "game";

/// Current item stack encoding version.
const STACK_FORMAT_VERSION: u8 = 1;

/// Content-derived item code, `domain:path`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemCode(String);

impl ItemCode {
    /// Creates a code from its string form.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Full code as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Domain part (`game` when the code has no prefix).
    #[must_use]
    pub fn domain(&self) -> &str {
        match self.0.split_once(':') {
            Some((domain, _)) => domain,
            None => DEFAULT_DOMAIN,
        }
    }

    /// Path part, without the domain.
    #[must_use]
    pub fn path(&self) -> &str {
        match self.0.split_once(':') {
            Some((_, path)) => path,
            None => &self.0,
        }
    }
}

impl fmt::Display for ItemCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ItemCode {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Tool sub-type reported by the game for tool-class items.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// Knife.
    Knife = 0,
    /// Chisel.
    Chisel = 1,
    /// Axe.
    Axe = 2,
    /// Pickaxe.
    Pickaxe = 3,
    /// Shovel.
    Shovel = 4,
    /// Saw.
    Saw = 5,
    /// Hammer.
    Hammer = 6,
    /// Hoe.
    Hoe = 7,
    /// Scythe.
    Scythe = 8,
    /// Shears.
    Shears = 9,
    /// Spear.
    Spear = 10,
    /// Sword.
    Sword = 11,
    /// Bow.
    Bow = 12,
    /// Club.
    Club = 13,
    /// Sling.
    Sling = 14,
    /// Wrench.
    Wrench = 15,
}

impl ToolKind {
    /// Small tools fit the forearm sheaths.
    #[inline]
    #[must_use]
    pub const fn is_small(self) -> bool {
        matches!(self, Self::Knife | Self::Chisel)
    }

    /// Converts from the wire discriminant.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::Knife,
            1 => Self::Chisel,
            2 => Self::Axe,
            3 => Self::Pickaxe,
            4 => Self::Shovel,
            5 => Self::Saw,
            6 => Self::Hammer,
            7 => Self::Hoe,
            8 => Self::Scythe,
            9 => Self::Shears,
            10 => Self::Spear,
            11 => Self::Sword,
            12 => Self::Bow,
            13 => Self::Club,
            14 => Self::Sling,
            15 => Self::Wrench,
            _ => return None,
        })
    }
}

/// What kind of collectible an item is, as far as attachment cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemClass {
    /// Not a tool and not a shield.
    Other,
    /// Tool-class item with its sub-type.
    Tool(ToolKind),
    /// Shield-class item.
    Shield,
}

impl ItemClass {
    const TAG_OTHER: u8 = 0;
    const TAG_TOOL: u8 = 1;
    const TAG_SHIELD: u8 = 2;
}

/// A stack held in an inventory slot.
///
/// Attributes keep the order the host stored them in; anything that needs a
/// stable order (cache keys) sorts them itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemStack {
    /// Item code.
    pub code: ItemCode,
    /// Collectible class.
    pub class: ItemClass,
    /// Remaining durability, 0 when the item has none.
    pub durability: i32,
    attributes: Vec<(String, String)>,
}

impl ItemStack {
    /// Creates a stack with no attributes.
    #[must_use]
    pub fn new(code: impl Into<ItemCode>, class: ItemClass) -> Self {
        Self {
            code: code.into(),
            class,
            durability: 0,
            attributes: Vec::new(),
        }
    }

    /// Shorthand for a tool stack.
    #[must_use]
    pub fn tool(code: impl Into<ItemCode>, kind: ToolKind) -> Self {
        Self::new(code, ItemClass::Tool(kind))
    }

    /// Shorthand for a shield stack.
    #[must_use]
    pub fn shield(code: impl Into<ItemCode>) -> Self {
        Self::new(code, ItemClass::Shield)
    }

    /// Shorthand for any other item.
    #[must_use]
    pub fn other(code: impl Into<ItemCode>) -> Self {
        Self::new(code, ItemClass::Other)
    }

    /// Sets durability.
    #[must_use]
    pub fn with_durability(mut self, durability: i32) -> Self {
        self.durability = durability;
        self
    }

    /// Sets an attribute, replacing any previous value for the key.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Sets an attribute in place.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Looks up an attribute.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Attributes in storage order.
    #[must_use]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Serializes the stack.
    ///
    /// # Errors
    ///
    /// Fails when a string field exceeds the wire limit.
    pub fn to_bytes(&self) -> SharedResult<Vec<u8>> {
        let mut writer = ByteWriter::with_capacity(32 + self.code.as_str().len());
        writer.write_u8(STACK_FORMAT_VERSION);
        writer.write_str(self.code.as_str())?;
        match self.class {
            ItemClass::Other => writer.write_u8(ItemClass::TAG_OTHER),
            ItemClass::Tool(kind) => {
                writer.write_u8(ItemClass::TAG_TOOL);
                writer.write_u8(kind as u8);
            }
            ItemClass::Shield => writer.write_u8(ItemClass::TAG_SHIELD),
        }
        writer.write_i32(self.durability);
        let count = u16::try_from(self.attributes.len()).map_err(|_| SharedError::FieldTooLong {
            len: self.attributes.len(),
            limit: usize::from(u16::MAX),
        })?;
        writer.write_u16(count);
        for (key, value) in &self.attributes {
            writer.write_str(key)?;
            writer.write_str(value)?;
        }
        Ok(writer.into_bytes())
    }

    /// Decodes a stack produced by [`ItemStack::to_bytes`].
    ///
    /// # Errors
    ///
    /// Fails on truncated, trailing or unknown data.
    pub fn from_bytes(bytes: &[u8]) -> SharedResult<Self> {
        let mut reader = ByteReader::new(bytes);
        let version = reader.read_u8()?;
        if version != STACK_FORMAT_VERSION {
            return Err(SharedError::UnsupportedStackVersion(version));
        }
        let code = ItemCode::new(reader.read_str()?);
        let class = match reader.read_u8()? {
            ItemClass::TAG_OTHER => ItemClass::Other,
            ItemClass::TAG_TOOL => {
                let raw = reader.read_u8()?;
                let kind = ToolKind::from_u8(raw).ok_or(SharedError::InvalidDiscriminant {
                    what: "tool kind",
                    value: raw,
                })?;
                ItemClass::Tool(kind)
            }
            ItemClass::TAG_SHIELD => ItemClass::Shield,
            other => {
                return Err(SharedError::InvalidDiscriminant {
                    what: "item class",
                    value: other,
                })
            }
        };
        let durability = reader.read_i32()?;
        let count = reader.read_u16()?;
        let mut attributes = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let key = reader.read_str()?;
            let value = reader.read_str()?;
            attributes.push((key, value));
        }
        reader.finish()?;
        Ok(Self {
            code,
            class,
            durability,
            attributes,
        })
    }
}

/// Immutable capture of a stack for the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemRef {
    /// Full item code.
    pub item_code: String,
    /// Serialized [`ItemStack`].
    pub stack_bytes: Vec<u8>,
}

impl ItemRef {
    /// Captures a stack.
    ///
    /// # Errors
    ///
    /// Fails when the stack cannot be serialized.
    pub fn capture(stack: &ItemStack) -> SharedResult<Self> {
        Ok(Self {
            item_code: stack.code.as_str().to_owned(),
            stack_bytes: stack.to_bytes()?,
        })
    }

    /// Decodes the captured stack.
    ///
    /// # Errors
    ///
    /// Fails when the bytes are not a valid stack.
    pub fn decode_stack(&self) -> SharedResult<ItemStack> {
        ItemStack::from_bytes(&self.stack_bytes)
    }
}
