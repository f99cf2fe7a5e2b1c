pub mod abstract_location;
pub mod constraint;
pub mod pointer_info;
