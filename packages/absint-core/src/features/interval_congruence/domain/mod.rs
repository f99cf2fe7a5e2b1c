pub mod interval_congruence;
