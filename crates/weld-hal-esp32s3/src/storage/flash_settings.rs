use embedded_storage::{ReadStorage, Storage};
use esp_bootloader_esp_idf::partitions::{
    DataPartitionSubType, PARTITION_TABLE_MAX_LEN, PartitionType, read_partition_table,
};
use esp_rom_sys::rom::spiflash::{
    ESP_ROM_SPIFLASH_RESULT_OK, esp_rom_spiflash_erase_sector, esp_rom_spiflash_read,
    esp_rom_spiflash_unlock, esp_rom_spiflash_write,
};
use log::debug;
use weld_core::storage::RecordStore;

const FLASH_SECTOR_SIZE: u32 = 4096;
const DEFAULT_FLASH_CAPACITY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FlashSettingsError {
    PartitionTable,
    SettingsPartitionMissing,
    PartitionTooSmall,
    FlashOpFailed(i32),
    OutOfBounds,
    Unaligned,
}

/// Settings record kept at the start of the reserved flash sector.
pub type FlashSettingsStore = RecordStore<FlashRegion>;

/// Opens the settings store on the reserved sector of the data partition.
pub fn open_settings_store() -> Result<FlashSettingsStore, FlashSettingsError> {
    Ok(RecordStore::new(FlashRegion::locate()?, 0))
}

#[derive(Debug)]
struct RawFlash;

impl RawFlash {
    fn new() -> Result<Self, FlashSettingsError> {
        let rc = unsafe { esp_rom_spiflash_unlock() };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashSettingsError::FlashOpFailed(rc));
        }
        Ok(Self)
    }

    fn erase_sector(&mut self, sector_addr: u32) -> Result<(), FlashSettingsError> {
        if !sector_addr.is_multiple_of(FLASH_SECTOR_SIZE) {
            return Err(FlashSettingsError::Unaligned);
        }

        let rc = unsafe { esp_rom_spiflash_erase_sector(sector_addr / FLASH_SECTOR_SIZE) };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashSettingsError::FlashOpFailed(rc));
        }
        Ok(())
    }

    fn read_word(&mut self, addr: u32) -> Result<u32, FlashSettingsError> {
        if !addr.is_multiple_of(4) {
            return Err(FlashSettingsError::Unaligned);
        }

        let mut word = 0u32;
        let rc = unsafe { esp_rom_spiflash_read(addr, &mut word as *mut u32 as *const u32, 4) };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashSettingsError::FlashOpFailed(rc));
        }
        Ok(word)
    }

    fn write_word(&mut self, addr: u32, word: u32) -> Result<(), FlashSettingsError> {
        if !addr.is_multiple_of(4) {
            return Err(FlashSettingsError::Unaligned);
        }

        let rc = unsafe { esp_rom_spiflash_write(addr, &word as *const u32, 4) };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashSettingsError::FlashOpFailed(rc));
        }
        Ok(())
    }

    /// Byte-granular read on top of the word-only ROM routine.
    fn read_bytes(&mut self, addr: u32, out: &mut [u8]) -> Result<(), FlashSettingsError> {
        let start = addr & !0b11;
        let end = (addr + out.len() as u32 + 3) & !0b11;

        for word_addr in (start..end).step_by(4) {
            let bytes = self.read_word(word_addr)?.to_le_bytes();
            for (i, b) in bytes.iter().enumerate() {
                let Some(dst) = (word_addr + i as u32).checked_sub(addr) else {
                    continue;
                };
                match out.get_mut(dst as usize) {
                    Some(slot) => *slot = *b,
                    None => break,
                }
            }
        }
        Ok(())
    }

    /// Programs `data` into an erased, word-aligned area.
    fn write_erased_words(&mut self, addr: u32, data: &[u8]) -> Result<(), FlashSettingsError> {
        if !addr.is_multiple_of(4) {
            return Err(FlashSettingsError::Unaligned);
        }

        for (i, chunk) in data.chunks(4).enumerate() {
            let mut bytes = [0xFFu8; 4];
            bytes[..chunk.len()].copy_from_slice(chunk);
            // Erased flash already reads 0xFF.
            if bytes == [0xFF; 4] {
                continue;
            }
            self.write_word(addr + (i as u32) * 4, u32::from_le_bytes(bytes))?;
        }
        Ok(())
    }
}

impl ReadStorage for RawFlash {
    type Error = FlashSettingsError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        self.read_bytes(offset, bytes)
    }

    fn capacity(&self) -> usize {
        DEFAULT_FLASH_CAPACITY_BYTES
    }
}

/// One 4 KiB flash sector exposed as byte storage. Offsets are relative to
/// the sector start; every write rewrites the whole sector.
#[derive(Debug)]
pub struct FlashRegion {
    flash: RawFlash,
    sector_addr: u32,
}

impl FlashRegion {
    /// Reserves the last sector of the first writable undefined-subtype data
    /// partition, falling back to the NVS partition.
    pub fn locate() -> Result<Self, FlashSettingsError> {
        let mut flash = RawFlash::new()?;

        let mut table_buf = [0u8; PARTITION_TABLE_MAX_LEN];
        let table = read_partition_table(&mut flash, &mut table_buf)
            .map_err(|_| FlashSettingsError::PartitionTable)?;

        let mut best_data_undefined: Option<(u32, u32)> = None;
        let mut fallback_nvs: Option<(u32, u32)> = None;

        for entry in table.iter() {
            if entry.is_read_only() || entry.len() < FLASH_SECTOR_SIZE {
                continue;
            }

            match entry.partition_type() {
                PartitionType::Data(DataPartitionSubType::Undefined) => {
                    best_data_undefined = Some((entry.offset(), entry.len()));
                    break;
                }
                PartitionType::Data(DataPartitionSubType::Nvs) => {
                    if fallback_nvs.is_none() {
                        fallback_nvs = Some((entry.offset(), entry.len()));
                    }
                }
                _ => {}
            }
        }

        let (offset, len) = best_data_undefined
            .or(fallback_nvs)
            .ok_or(FlashSettingsError::SettingsPartitionMissing)?;

        if len < FLASH_SECTOR_SIZE {
            return Err(FlashSettingsError::PartitionTooSmall);
        }

        let sector_addr = offset + len - FLASH_SECTOR_SIZE;
        debug!("settings sector at {:#x}", sector_addr);
        Ok(Self { flash, sector_addr })
    }

    fn check_bounds(&self, offset: u32, len: usize) -> Result<(), FlashSettingsError> {
        let end = offset as usize + len;
        if end > FLASH_SECTOR_SIZE as usize {
            return Err(FlashSettingsError::OutOfBounds);
        }
        Ok(())
    }
}

impl ReadStorage for FlashRegion {
    type Error = FlashSettingsError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        self.check_bounds(offset, bytes.len())?;
        self.flash.read_bytes(self.sector_addr + offset, bytes)
    }

    fn capacity(&self) -> usize {
        FLASH_SECTOR_SIZE as usize
    }
}

impl Storage for FlashRegion {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        self.check_bounds(offset, bytes.len())?;

        let mut sector = [0u8; FLASH_SECTOR_SIZE as usize];
        self.flash.read_bytes(self.sector_addr, &mut sector)?;

        let start = offset as usize;
        sector[start..start + bytes.len()].copy_from_slice(bytes);

        self.flash.erase_sector(self.sector_addr)?;
        self.flash.write_erased_words(self.sector_addr, &sector)
    }
}
