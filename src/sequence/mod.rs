pub(crate) mod effect_sequence;
