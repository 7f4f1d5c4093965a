pub mod name_field;
pub mod similarity;
