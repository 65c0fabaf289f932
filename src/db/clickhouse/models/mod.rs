pub mod snapshot_row;
