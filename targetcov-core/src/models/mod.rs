pub mod interval;
pub mod record;

// re-export for cleaner imports
pub use self::interval::Interval;
pub use self::record::IntervalRecord;
