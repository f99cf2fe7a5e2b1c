pub mod non_relational;
