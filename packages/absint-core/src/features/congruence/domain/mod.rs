pub mod congruence;
