/// Shot identifiers are random UUIDs assigned at creation.
pub type ShotId = uuid::Uuid;

/// Seeds are plain non-negative integers as accepted by the providers.
pub type Seed = u64;
