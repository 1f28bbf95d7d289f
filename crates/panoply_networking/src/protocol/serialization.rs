//! # Packet Serialization
//!
//! ```text
//! Packet        := type:u8 payload
//! Update        := sequence:u64 player:str backpack:u8 count:u8
//!                  { slot:u8 item_code:str stack:bytes }*count
//! Request       := player:str
//! ConfigUpdate  := player:str config_toml:bytes
//! ```
//!
//! Integers are little-endian, strings carry a `u16` length, blobs a `u32`
//! length. The serializer keeps its buffer between packets.

use std::collections::BTreeMap;

use panoply_shared::{
    BackpackState, ByteReader, ByteWriter, ConfigUpdateMessage, EquipmentSlot, ItemRef, PlayerId,
    RequestMessage, UpdateMessage, SLOT_COUNT,
};

use super::packets::{Packet, PacketType};
use crate::error::{ProtocolError, ProtocolResult};

/// Packet serializer with a reusable buffer and a size limit.
#[derive(Debug)]
pub struct PacketSerializer {
    writer: ByteWriter,
    max_size: usize,
}

impl PacketSerializer {
    /// Creates a serializer refusing packets above `max_size` bytes.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            writer: ByteWriter::with_capacity(256),
            max_size,
        }
    }

    /// Size limit in bytes.
    #[inline]
    #[must_use]
    pub const fn max_size(&self) -> usize {
        self.max_size
    }

    /// Serializes a packet. The returned slice is valid until the next call.
    ///
    /// # Errors
    ///
    /// Fails when a field exceeds its length prefix or the packet exceeds
    /// the size limit.
    pub fn serialize(&mut self, packet: &Packet) -> ProtocolResult<&[u8]> {
        self.writer.reset();
        self.writer.write_u8(packet.packet_type() as u8);

        match packet {
            Packet::Update(update) => self.write_update(update)?,
            Packet::Request(request) => self.writer.write_str(request.player_id.as_str())?,
            Packet::ConfigUpdate(config) => {
                self.writer.write_str(config.player_id.as_str())?;
                self.writer.write_bytes(config.config_toml.as_bytes())?;
            }
        }

        if self.writer.len() > self.max_size {
            return Err(ProtocolError::PacketTooLarge {
                size: self.writer.len(),
                limit: self.max_size,
            });
        }
        Ok(self.writer.as_slice())
    }

    fn write_update(&mut self, update: &UpdateMessage) -> ProtocolResult<()> {
        self.writer.write_u64(update.sequence);
        self.writer.write_str(update.player_id.as_str())?;
        self.writer.write_u8(update.backpack as u8);

        // BTreeMap keys are unique slots, so at most SLOT_COUNT entries.
        let count = u8::try_from(update.slots.len())
            .map_err(|_| ProtocolError::TooManySlots(u8::MAX))?;
        self.writer.write_u8(count);
        for (slot, item) in &update.slots {
            self.writer.write_u8(*slot as u8);
            self.writer.write_str(&item.item_code)?;
            self.writer.write_bytes(&item.stack_bytes)?;
        }
        Ok(())
    }
}

/// Packet deserializer over one received buffer.
#[derive(Debug)]
pub struct PacketDeserializer<'a> {
    reader: ByteReader<'a>,
}

impl<'a> PacketDeserializer<'a> {
    /// Creates a deserializer from a buffer.
    #[must_use]
    pub const fn new(buffer: &'a [u8]) -> Self {
        Self {
            reader: ByteReader::new(buffer),
        }
    }

    /// Decodes the whole buffer as one packet.
    ///
    /// # Errors
    ///
    /// Fails on unknown tags, truncated or trailing bytes, invalid slots,
    /// duplicate slots and out-of-range discriminants.
    pub fn deserialize(mut self) -> ProtocolResult<Packet> {
        let tag = self.reader.read_u8()?;
        let packet_type = PacketType::from_u8(tag).ok_or(ProtocolError::UnknownPacketType(tag))?;

        let packet = match packet_type {
            PacketType::Update => Packet::Update(self.read_update()?),
            PacketType::Request => Packet::Request(RequestMessage {
                player_id: PlayerId::new(self.reader.read_str()?),
            }),
            PacketType::ConfigUpdate => {
                let player_id = PlayerId::new(self.reader.read_str()?);
                let config_toml = String::from_utf8(self.reader.read_bytes()?)
                    .map_err(|_| ProtocolError::InvalidConfigText)?;
                Packet::ConfigUpdate(ConfigUpdateMessage {
                    player_id,
                    config_toml,
                })
            }
        };

        self.reader.finish()?;
        Ok(packet)
    }

    fn read_update(&mut self) -> ProtocolResult<UpdateMessage> {
        let sequence = self.reader.read_u64()?;
        let player_id = PlayerId::new(self.reader.read_str()?);
        let backpack_tag = self.reader.read_u8()?;
        let backpack =
            BackpackState::from_u8(backpack_tag).ok_or(ProtocolError::InvalidBackpack(backpack_tag))?;

        let count = self.reader.read_u8()?;
        if usize::from(count) > SLOT_COUNT {
            return Err(ProtocolError::TooManySlots(count));
        }

        let mut slots = BTreeMap::new();
        for _ in 0..count {
            let index = self.reader.read_u8()?;
            let slot = EquipmentSlot::from_index(usize::from(index))
                .ok_or(ProtocolError::InvalidSlot(index))?;
            let item = ItemRef {
                item_code: self.reader.read_str()?,
                stack_bytes: self.reader.read_bytes()?,
            };
            if slots.insert(slot, item).is_some() {
                return Err(ProtocolError::DuplicateSlot(index));
            }
        }

        Ok(UpdateMessage {
            sequence,
            player_id,
            backpack,
            slots,
        })
    }
}
