pub mod amfi_provider;
pub mod csv_holdings;
