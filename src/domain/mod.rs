// Domain layer: records, snapshots and collaborator ports. No HTTP here.

pub mod model;
pub mod ports;
