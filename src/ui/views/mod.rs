//! One module per visualization mode. Each draws from a precomputed
//! [`Segmentation`](crate::data::segment::Segmentation) and never fails:
//! empty segments simply leave their chart elements out.

pub mod angina;
pub mod bp;
pub mod cholesterol;
pub mod ecg;
