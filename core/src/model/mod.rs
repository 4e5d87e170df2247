//! Study and series hierarchy
//!
//! A [`Study`] owns its [`Series`], a series owns its image attribute
//! sets. Everything is materialised up front by [`StudyBuilder`] so the
//! generator can stream images in a fixed study-major, series-minor order.

mod series;
mod study;

pub use series::{image_attributes, Series, SeriesBuilder};
pub use study::{Study, StudyBuilder, StudyShape};
