//! AI Closet Common Library
//!
//! コアパイプラインで共有される型とユーティリティ

pub mod error;
pub mod parser;
pub mod prompts;
pub mod types;
pub mod vocab;

pub use error::{Error, Result};
pub use parser::{
    extract_json_array, extract_json_object, parse_categorization_response,
    parse_segmentation_response, ValidationPolicy,
};
pub use prompts::{
    build_categorization_system_prompt, build_segmentation_system_prompt,
    CATEGORIZATION_USER_PROMPT, SEGMENTATION_USER_PROMPT,
};
pub use types::{BoundingBox, CandidateAttributes, CandidateItem, RawDetectedItem};
pub use vocab::{CategoryGroup, Vocabulary};
