//! Settings record layout over byte-addressed non-volatile storage.

use embedded_storage::{ReadStorage, Storage};
use log::{debug, warn};

use crate::settings::{SettingsLimits, SettingsStore, WeldSettings};

const RECORD_MARKER: u8 = 0x57; // 'W'
const RECORD_VERSION: u8 = 1;
const PAYLOAD_LEN: usize = 5;
/// Bytes occupied by one settings record.
pub const RECORD_LEN: usize = PAYLOAD_LEN + 4;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RecordError<StorageErr> {
    Storage(StorageErr),
    /// The record does not fit in the backing storage at the configured offset.
    OutOfRange,
}

/// [`SettingsStore`] writing one checksummed record at a fixed offset.
///
/// Layout, little endian:
/// `[0] marker, [1] version, [2] repeat_count, [3..5] delay_ms, [5..9] checksum`.
#[derive(Debug)]
pub struct RecordStore<S> {
    storage: S,
    offset: u32,
}

impl<S> RecordStore<S>
where
    S: Storage,
{
    pub const fn new(storage: S, offset: u32) -> Self {
        Self { storage, offset }
    }

    fn check_range(&self) -> Result<(), RecordError<S::Error>> {
        let end = self.offset as usize + RECORD_LEN;
        if end > self.storage.capacity() {
            return Err(RecordError::OutOfRange);
        }
        Ok(())
    }

    fn read_record(&mut self) -> Result<[u8; RECORD_LEN], RecordError<S::Error>> {
        self.check_range()?;
        let mut buf = [0u8; RECORD_LEN];
        self.storage
            .read(self.offset, &mut buf)
            .map_err(RecordError::Storage)?;
        Ok(buf)
    }
}

impl<S> SettingsStore for RecordStore<S>
where
    S: Storage,
{
    type Error = RecordError<S::Error>;

    fn load(&mut self) -> Result<Option<WeldSettings>, Self::Error> {
        let buf = self.read_record()?;
        Ok(decode_record(&buf))
    }

    fn save(&mut self, settings: &WeldSettings) -> Result<(), Self::Error> {
        let record = encode_record(settings);
        if self.read_record()? == record {
            return Ok(());
        }

        self.storage
            .write(self.offset, &record)
            .map_err(RecordError::Storage)
    }
}

/// No backing store: nothing loads, saves are accepted and dropped.
impl<T> SettingsStore for Option<T>
where
    T: SettingsStore,
{
    type Error = T::Error;

    fn load(&mut self) -> Result<Option<WeldSettings>, Self::Error> {
        match self {
            Some(store) => store.load(),
            None => Ok(None),
        }
    }

    fn save(&mut self, settings: &WeldSettings) -> Result<(), Self::Error> {
        match self {
            Some(store) => store.save(settings),
            None => Ok(()),
        }
    }
}

/// Loads persisted settings, healing the store with defaults when it holds
/// no valid record. Never fails: storage faults degrade to defaults.
pub fn load_or_init<ST>(store: &mut ST, limits: SettingsLimits) -> WeldSettings
where
    ST: SettingsStore,
{
    match store.load() {
        Ok(Some(saved)) => {
            debug!(
                "settings restored: repeat={} delay_ms={}",
                saved.repeat_count, saved.delay_ms
            );
            if !saved.is_within(limits) {
                warn!("saved settings exceed this panel's limits; clamping");
            }
            return saved.clamped(limits);
        }
        Ok(None) => warn!("no saved settings; writing defaults"),
        Err(_) => warn!("failed to read saved settings; writing defaults"),
    }

    let defaults = WeldSettings::default().clamped(limits);
    if store.save(&defaults).is_err() {
        warn!("failed to persist default settings");
    }
    defaults
}

pub fn encode_record(settings: &WeldSettings) -> [u8; RECORD_LEN] {
    let mut buf = [0u8; RECORD_LEN];
    buf[0] = RECORD_MARKER;
    buf[1] = RECORD_VERSION;
    buf[2] = settings.repeat_count;
    buf[3..5].copy_from_slice(&settings.delay_ms.to_le_bytes());
    let checksum = checksum32(&buf[..PAYLOAD_LEN]);
    buf[PAYLOAD_LEN..].copy_from_slice(&checksum.to_le_bytes());
    buf
}

/// Returns `None` for blank, foreign, corrupted or implausible records.
pub fn decode_record(buf: &[u8; RECORD_LEN]) -> Option<WeldSettings> {
    if buf[0] != RECORD_MARKER || buf[1] != RECORD_VERSION {
        return None;
    }

    let expected = u32::from_le_bytes([buf[5], buf[6], buf[7], buf[8]]);
    if checksum32(&buf[..PAYLOAD_LEN]) != expected {
        return None;
    }

    let settings = WeldSettings::new(buf[2], u16::from_le_bytes([buf[3], buf[4]]));
    if settings.repeat_count == 0 || settings.delay_ms == 0 {
        return None;
    }
    Some(settings)
}

fn checksum32(bytes: &[u8]) -> u32 {
    let mut hash = 0x811C9DC5u32;
    for b in bytes {
        hash ^= *b as u32;
        hash = hash.wrapping_mul(16777619);
    }
    hash
}

/// RAM-backed storage, erased to `0xFF` like flash.
#[derive(Debug, Clone)]
pub struct MemoryStorage<const N: usize> {
    bytes: [u8; N],
    writes: usize,
}

impl<const N: usize> Default for MemoryStorage<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> MemoryStorage<N> {
    pub const fn new() -> Self {
        Self {
            bytes: [0xFF; N],
            writes: 0,
        }
    }

    pub fn as_bytes(&self) -> &[u8; N] {
        &self.bytes
    }

    /// Number of `write` calls that reached the medium.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl<const N: usize> ReadStorage for MemoryStorage<N> {
    type Error = RecordError<()>;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let start = offset as usize;
        let src = self
            .bytes
            .get(start..start + bytes.len())
            .ok_or(RecordError::OutOfRange)?;
        bytes.copy_from_slice(src);
        Ok(())
    }

    fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Storage for MemoryStorage<N> {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let start = offset as usize;
        let dst = self
            .bytes
            .get_mut(start..start + bytes.len())
            .ok_or(RecordError::OutOfRange)?;
        dst.copy_from_slice(bytes);
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingStore;

    impl SettingsStore for FailingStore {
        type Error = ();

        fn load(&mut self) -> Result<Option<WeldSettings>, Self::Error> {
            Err(())
        }

        fn save(&mut self, _settings: &WeldSettings) -> Result<(), Self::Error> {
            Err(())
        }
    }

    #[test]
    fn blank_storage_loads_nothing() {
        let mut store = RecordStore::new(MemoryStorage::<32>::new(), 0);
        assert_eq!(store.load(), Ok(None));
    }

    #[test]
    fn saved_settings_load_back() {
        let mut store = RecordStore::new(MemoryStorage::<32>::new(), 4);
        let settings = WeldSettings::new(8, 49);
        store.save(&settings).unwrap();
        assert_eq!(store.load(), Ok(Some(settings)));
    }

    #[test]
    fn identical_save_does_not_touch_the_medium() {
        let mut store = RecordStore::new(MemoryStorage::<32>::new(), 0);
        let settings = WeldSettings::new(12, 300);
        store.save(&settings).unwrap();
        let first = *store.storage.as_bytes();
        store.save(&settings).unwrap();

        assert_eq!(store.storage.write_count(), 1);
        assert_eq!(store.storage.as_bytes(), &first);
        assert_eq!(store.load(), Ok(Some(settings)));
    }

    #[test]
    fn corrupted_record_is_rejected() {
        let mut record = encode_record(&WeldSettings::new(10, 100));
        record[3] ^= 0x01;
        assert_eq!(decode_record(&record), None);
    }

    #[test]
    fn zero_fields_are_rejected_even_with_valid_checksum() {
        let record = encode_record(&WeldSettings::new(0, 100));
        assert_eq!(decode_record(&record), None);
    }

    #[test]
    fn foreign_marker_is_rejected() {
        let mut record = encode_record(&WeldSettings::default());
        record[0] = 0x00;
        assert_eq!(decode_record(&record), None);
    }

    #[test]
    fn record_past_capacity_is_out_of_range() {
        let mut store = RecordStore::new(MemoryStorage::<8>::new(), 0);
        assert_eq!(store.load(), Err(RecordError::OutOfRange));
    }

    #[test]
    fn first_boot_writes_defaults_once() {
        let mut store = RecordStore::new(MemoryStorage::<16>::new(), 0);
        let settings = load_or_init(&mut store, SettingsLimits::ENCODER);

        assert_eq!(settings, WeldSettings::default());
        assert_eq!(store.storage.write_count(), 1);
        assert_eq!(store.load(), Ok(Some(WeldSettings::default())));
    }

    #[test]
    fn stored_value_above_variant_limit_is_clamped() {
        let mut store = RecordStore::new(MemoryStorage::<16>::new(), 0);
        store.save(&WeldSettings::new(20, 5_000)).unwrap();

        let settings = load_or_init(&mut store, SettingsLimits::ENCODER);
        assert_eq!(settings, WeldSettings::new(20, 999));
    }

    #[test]
    fn read_failure_degrades_to_defaults() {
        let mut store = FailingStore;
        assert_eq!(
            load_or_init(&mut store, SettingsLimits::BUTTONS),
            WeldSettings::default()
        );
    }

    #[test]
    fn missing_store_is_volatile() {
        let mut store: Option<RecordStore<MemoryStorage<16>>> = None;
        assert_eq!(
            load_or_init(&mut store, SettingsLimits::BUTTONS),
            WeldSettings::default()
        );
        assert_eq!(store.save(&WeldSettings::new(9, 9)), Ok(()));
    }
}
