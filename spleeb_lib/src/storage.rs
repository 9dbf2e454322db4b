use core::ops::Range;

use embassy_sync::{blocking_mutex::raw::RawMutex, signal::Signal};
use embedded_storage_async::nor_flash::{ErrorType, NorFlash};
use sequential_storage::{
    cache::KeyCacheImpl,
    erase_all,
    map::{fetch_item, store_item},
};

use crate::record::ConfigRecord;

type InternalStorageKey = u16;

/// Marks a flash range this firmware has formatted
const STORAGE_MAGIC: u32 = 0x5EEB_0001;

pub type StorageResult<T, S> = Result<T, sequential_storage::Error<<S as ErrorType>::Error>>;

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageKey {
    StorageCheck,
    KbConfig,
}

impl StorageKey {
    fn to_key(&self) -> InternalStorageKey {
        match self {
            StorageKey::StorageCheck => 0,
            StorageKey::KbConfig => 1,
        }
    }
}

/// The keyboard's single config slot in a flash range
pub struct Storage<S: NorFlash, K: KeyCacheImpl<InternalStorageKey>> {
    flash: S,
    cache: K,
    flash_range: Range<u32>,
    first_boot: bool,
}

impl<S: NorFlash, K: KeyCacheImpl<InternalStorageKey>> Storage<S, K> {
    /// Opens the flash range. A range without the format marker is erased and
    /// the boot is reported as a first boot.
    pub async fn init(
        mut flash: S,
        flash_range: Range<u32>,
        mut cache: K,
    ) -> StorageResult<Self, S> {
        let mut data_buffer = [0; 64];

        let formatted = match fetch_item::<InternalStorageKey, u32, _>(
            &mut flash,
            flash_range.clone(),
            &mut cache,
            &mut data_buffer,
            &StorageKey::StorageCheck.to_key(),
        )
        .await
        {
            Ok(Some(STORAGE_MAGIC)) => true,
            Ok(_) => false,
            Err(_) => {
                warn!("Unreadable config storage, reformatting");
                false
            }
        };

        if formatted {
            info!("Valid Storage");
        } else {
            erase_all(&mut flash, flash_range.clone()).await?;
            store_item(
                &mut flash,
                flash_range.clone(),
                &mut cache,
                &mut data_buffer,
                &StorageKey::StorageCheck.to_key(),
                &STORAGE_MAGIC,
            )
            .await?;
            info!("Storage formatted");
        }

        Ok(Self {
            flash,
            cache,
            flash_range,
            first_boot: !formatted,
        })
    }

    /// True when `init` had to format the range
    pub fn is_first_boot(&self) -> bool {
        self.first_boot
    }

    /// Loads the stored config with the volatile toggles cleared. An empty
    /// slot yields the factory defaults.
    pub async fn read_config(&mut self) -> StorageResult<ConfigRecord, S> {
        let mut buffer = [0; 64];
        let stored = fetch_item::<InternalStorageKey, ConfigRecord, _>(
            &mut self.flash,
            self.flash_range.clone(),
            &mut self.cache,
            &mut buffer,
            &StorageKey::KbConfig.to_key(),
        )
        .await?;
        Ok(stored.unwrap_or(ConfigRecord::default()))
    }

    /// Stores `record` verbatim. Skipped when the persisted fields already match.
    pub async fn write_config(&mut self, record: &ConfigRecord) -> StorageResult<(), S> {
        let mut buffer = [0; 64];
        let stored = fetch_item::<InternalStorageKey, ConfigRecord, _>(
            &mut self.flash,
            self.flash_range.clone(),
            &mut self.cache,
            &mut buffer,
            &StorageKey::KbConfig.to_key(),
        )
        .await?;
        if stored.is_some_and(|stored| stored.persisted_eq(record)) {
            return Ok(());
        }

        store_item(
            &mut self.flash,
            self.flash_range.clone(),
            &mut self.cache,
            &mut buffer,
            &StorageKey::KbConfig.to_key(),
            record,
        )
        .await?;
        info!(
            "Stored config | default dpi {} | sniping dpi {} | encoders {} {}",
            record.default_dpi_index,
            record.sniping_dpi_index,
            record.encoder_modes[0],
            record.encoder_modes[1]
        );
        Ok(())
    }

    /// Writes the factory defaults and returns them
    pub async fn initialize_defaults(&mut self) -> StorageResult<ConfigRecord, S> {
        let record = ConfigRecord::default();
        self.write_config(&record).await?;
        Ok(record)
    }

    /// Wipes the range, including the format marker
    pub async fn clear(&mut self) -> StorageResult<(), S> {
        erase_all(&mut self.flash, self.flash_range.clone()).await?;
        self.first_boot = true;
        Ok(())
    }

    /// Persists every record committed through `commits`. Runs forever; meant
    /// to be joined with the keyboard's main loop.
    pub async fn run_storage<M: RawMutex>(&mut self, commits: &Signal<M, ConfigRecord>) -> ! {
        loop {
            let record = commits.wait().await;
            if self.write_config(&record).await.is_err() {
                error!("Failed to store config");
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn release(self) -> S {
        self.flash
    }
}
