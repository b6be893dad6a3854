// =============================================================================
// HTTP surface — form page, chart page, health
// =============================================================================

pub mod pages;
pub mod rest;
