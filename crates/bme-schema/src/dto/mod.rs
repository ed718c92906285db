//! UI-facing transfer objects and their mappers.
//!
//! Transfer objects carry declared data only: passthrough content and
//! unrecognized list entries stay with the domain object. Typed attributes
//! travel as their raw text so an unedited transfer object maps back to the
//! same attribute values.

pub mod class_divisions;
pub mod credits;

pub use class_divisions::{
    ClassDivisionDto, ClassDivisionMapper, ClassDivisionsDto, GroupItemDto, PerkDto, PerkEffectDto,
};
pub use credits::{
    CategoryDto, CategoryItemDto, CreditsDto, CreditsItemDto, CreditsMapper, EntryDto,
    ImageDto, LoadFromFileDto, SectionDto, SectionItemDto,
};

use std::fmt;
use std::str::FromStr;

use bme_model::Scalar;

fn raw<T>(scalar: Option<&Scalar<T>>) -> Option<String>
where
    T: FromStr + fmt::Display,
{
    scalar.map(|scalar| scalar.raw().to_string())
}

fn scalar<T>(raw: Option<&String>) -> Option<Scalar<T>>
where
    T: FromStr + fmt::Display,
{
    raw.map(|raw| Scalar::parse(raw.as_str()))
}
