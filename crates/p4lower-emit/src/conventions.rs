//! Names and parameter lists shared with the packet-pipeline runtime.

pub const SHORT_STDPARAMS: &str = "packet_descriptor_t* pd, lookup_table_t** tables";
pub const SHORT_STDPARAMS_IN: &str = "pd, tables";
pub const STDPARAMS: &str = "packet_descriptor_t* pd, lookup_table_t** tables, parser_state_t* pstate";
pub const STDPARAMS_IN: &str = "pd, tables, pstate";

/// Storage instance holding every metadata field.
pub const ALL_METADATAS: &str = "header_instance_all_metadatas";

pub const NO_CONTROL_PLANE_GUARD: &str = "#ifdef T4P4S_NO_CONTROL_PLANE\n#error \"Generating digest when T4P4S_NO_CONTROL_PLANE is defined\"\n#endif";

pub fn header_instance(name: &str) -> String {
    format!("header_instance_{}", name)
}

/// Field id within its header type, paired with a header instance in packet accessors.
pub fn field_id(type_name: &str, field: &str) -> String {
    format!("field_{}_{}", type_name, field)
}

/// Field id of a concrete instance, as used by `field_desc`.
pub fn field_instance(instance: &str, field: &str) -> String {
    format!("field_instance_{}_{}", instance, field)
}

pub fn parser_state_call(state: &str) -> String {
    format!("parser_state_{}(pd, buf, tables, pstate);", state)
}

pub fn lock_name(control_type: &str) -> String {
    format!("&{}_lock", control_type)
}
