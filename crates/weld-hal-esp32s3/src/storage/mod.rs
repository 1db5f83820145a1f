pub mod flash_settings;
