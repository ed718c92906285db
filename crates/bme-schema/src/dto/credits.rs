use bme_model::{Mapper, OrderedList, XmlBool};
use serde::{Deserialize, Serialize};

use super::{raw, scalar};
use crate::credits::{
    Category, CategoryItem, Credits, CreditsItem, EmptyLine, Entry, Image, LoadFromFile, Section,
    SectionItem,
};

/// Credits with one ordered item list per container, so a round trip
/// through the editor keeps sections and entries where they were.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreditsDto {
    pub items: Vec<CreditsItemDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CreditsItemDto {
    Category(CategoryDto),
    LoadFromFile(LoadFromFileDto),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryDto {
    pub text: Option<String>,
    pub items: Vec<CategoryItemDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CategoryItemDto {
    Section(SectionDto),
    Entry(EntryDto),
    EmptyLine,
    LoadFromFile(LoadFromFileDto),
    Image(ImageDto),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionDto {
    pub text: Option<String>,
    pub items: Vec<SectionItemDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionItemDto {
    Entry(EntryDto),
    EmptyLine,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryDto {
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub empty_lines: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadFromFileDto {
    pub name: Option<String>,
    pub platform_specific: Option<String>,
    pub console_specific: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageDto {
    pub text: Option<String>,
}

fn is_zero(count: &usize) -> bool {
    *count == 0
}

pub struct CreditsMapper;

impl Mapper for CreditsMapper {
    type Do = Credits;
    type Dto = CreditsDto;

    fn to_dto(source: &Credits) -> CreditsDto {
        CreditsDto {
            items: source
                .items
                .known()
                .map(|item| match item {
                    CreditsItem::Category(category) => {
                        CreditsItemDto::Category(category_to_dto(category))
                    }
                    CreditsItem::LoadFromFile(include) => {
                        CreditsItemDto::LoadFromFile(include_to_dto(include))
                    }
                })
                .collect(),
        }
    }

    fn to_do(source: &CreditsDto) -> Credits {
        Credits {
            items: source
                .items
                .iter()
                .map(|item| match item {
                    CreditsItemDto::Category(category) => {
                        CreditsItem::Category(category_to_do(category))
                    }
                    CreditsItemDto::LoadFromFile(include) => {
                        CreditsItem::LoadFromFile(include_to_do(include))
                    }
                })
                .collect(),
            ..Credits::default()
        }
    }
}

fn category_to_dto(category: &Category) -> CategoryDto {
    CategoryDto {
        text: category.text.clone(),
        items: category
            .items
            .known()
            .map(|item| match item {
                CategoryItem::Section(section) => CategoryItemDto::Section(section_to_dto(section)),
                CategoryItem::Entry(entry) => CategoryItemDto::Entry(entry_to_dto(entry)),
                CategoryItem::EmptyLine(_) => CategoryItemDto::EmptyLine,
                CategoryItem::LoadFromFile(include) => {
                    CategoryItemDto::LoadFromFile(include_to_dto(include))
                }
                CategoryItem::Image(image) => CategoryItemDto::Image(ImageDto {
                    text: image.text.clone(),
                }),
            })
            .collect(),
    }
}

fn category_to_do(category: &CategoryDto) -> Category {
    let items: OrderedList<CategoryItem> = category
        .items
        .iter()
        .map(|item| match item {
            CategoryItemDto::Section(section) => CategoryItem::Section(section_to_do(section)),
            CategoryItemDto::Entry(entry) => CategoryItem::Entry(entry_to_do(entry)),
            CategoryItemDto::EmptyLine => CategoryItem::EmptyLine(EmptyLine::default()),
            CategoryItemDto::LoadFromFile(include) => {
                CategoryItem::LoadFromFile(include_to_do(include))
            }
            CategoryItemDto::Image(image) => CategoryItem::Image(Image {
                text: image.text.clone(),
                ..Image::default()
            }),
        })
        .collect();
    Category {
        text: category.text.clone(),
        items,
        ..Category::default()
    }
}

fn section_to_dto(section: &Section) -> SectionDto {
    SectionDto {
        text: section.text.clone(),
        items: section
            .items
            .known()
            .map(|item| match item {
                SectionItem::Entry(entry) => SectionItemDto::Entry(entry_to_dto(entry)),
                SectionItem::EmptyLine(_) => SectionItemDto::EmptyLine,
            })
            .collect(),
    }
}

fn section_to_do(section: &SectionDto) -> Section {
    Section {
        text: section.text.clone(),
        items: section
            .items
            .iter()
            .map(|item| match item {
                SectionItemDto::Entry(entry) => SectionItem::Entry(entry_to_do(entry)),
                SectionItemDto::EmptyLine => SectionItem::EmptyLine(EmptyLine::default()),
            })
            .collect(),
        ..Section::default()
    }
}

fn entry_to_dto(entry: &Entry) -> EntryDto {
    EntryDto {
        text: entry.text.clone(),
        empty_lines: entry.empty_lines.len(),
    }
}

fn entry_to_do(entry: &EntryDto) -> Entry {
    Entry {
        text: entry.text.clone(),
        empty_lines: vec![EmptyLine::default(); entry.empty_lines],
        ..Entry::default()
    }
}

fn include_to_dto(include: &LoadFromFile) -> LoadFromFileDto {
    LoadFromFileDto {
        name: include.name.clone(),
        platform_specific: raw(include.platform_specific.as_ref()),
        console_specific: raw(include.console_specific.as_ref()),
    }
}

fn include_to_do(include: &LoadFromFileDto) -> LoadFromFile {
    LoadFromFile {
        name: include.name.clone(),
        platform_specific: scalar::<XmlBool>(include.platform_specific.as_ref()),
        console_specific: scalar::<XmlBool>(include.console_specific.as_ref()),
        ..LoadFromFile::default()
    }
}
