//! Raw acquisition events and their banks.
//!
//! The wire format is parsed by the host; this module only describes what a
//! stage is allowed to ask of an event.
use serde::{Deserialize, Serialize};

/// Data type of the words stored in a bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BankType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
    Struct,
}

impl BankType {
    /// Size in bytes of one element, `None` for structured banks.
    pub fn element_size(&self) -> Option<usize> {
        match self {
            Self::U8 | Self::I8 => Some(1),
            Self::U16 | Self::I16 => Some(2),
            Self::U32 | Self::I32 | Self::F32 => Some(4),
            Self::F64 => Some(8),
            Self::Struct => None,
        }
    }
}

/// A named, typed chunk of raw data inside an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bank {
    name: String,
    bank_type: BankType,
    data: Vec<u8>,
}

impl Bank {
    pub fn new(name: impl Into<String>, bank_type: BankType, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bank_type,
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bank_type(&self) -> BankType {
        self.bank_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of elements, or the byte length for structured banks.
    pub fn len(&self) -> usize {
        match self.bank_type.element_size() {
            Some(size) => self.data.len() / size,
            None => self.data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// The event interface a stage works against.
pub trait RawEvent {
    /// Materializes the bank list. Must be called before decoding.
    fn find_all_banks(&mut self);

    fn serial_number(&self) -> u32;

    /// Banks discovered by [`RawEvent::find_all_banks`].
    fn banks(&self) -> &[Bank];

    fn find_bank(&self, name: &str) -> Option<&Bank> {
        self.banks().iter().find(|b| b.name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventHeader {
    pub event_id: u16,
    pub trigger_mask: u16,
    pub serial_number: u32,
    pub timestamp: u32,
}

/// An event whose banks were already split out by the host.
///
/// Banks stay hidden until [`RawEvent::find_all_banks`] runs, mirroring a
/// host event that indexes its payload lazily.
#[derive(Debug, Clone, Default)]
pub struct MidasEvent {
    header: EventHeader,
    banks: Vec<Bank>,
    discovered: bool,
}

impl MidasEvent {
    pub fn new(header: EventHeader) -> Self {
        Self {
            header,
            banks: Vec::new(),
            discovered: false,
        }
    }

    pub fn with_bank(mut self, bank: Bank) -> Self {
        self.banks.push(bank);
        self
    }

    pub fn header(&self) -> &EventHeader {
        &self.header
    }

    pub fn banks_discovered(&self) -> bool {
        self.discovered
    }
}

impl RawEvent for MidasEvent {
    fn find_all_banks(&mut self) {
        self.discovered = true;
    }

    fn serial_number(&self) -> u32 {
        self.header.serial_number
    }

    fn banks(&self) -> &[Bank] {
        if self.discovered {
            &self.banks[..]
        } else {
            &[]
        }
    }
}
