pub mod identity_assigner;
pub mod rank_identity_assigner;
