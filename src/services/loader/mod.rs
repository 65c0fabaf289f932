pub mod batch_loader;
