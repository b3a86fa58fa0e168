pub mod acpi_wakeup;
pub mod command;
pub mod inhibitors;
pub mod sysfs;
