//! Embedded signature seed data for common built-in functions and
//! classes. Entries use the fully-qualified union string format the type
//! system parses directly. Overloaded built-ins chain alternates with a
//! trailing `'N` key suffix.

/// (function key, return type, [(parameter name, parameter type)...])
pub(crate) const FUNCTION_SIGNATURES: &[(&str, &str, &[(&str, &str)])] = &[
    ("abs", "int|float", &[("number", "int|float")]),
    ("array_combine", "array|false", &[("keys", "array"), ("values", "array")]),
    ("array_filter", "array", &[("input", "array")]),
    ("array_filter'1", "array", &[("input", "array"), ("callback", "callable")]),
    ("array_flip", "array", &[("input", "array")]),
    ("array_key_exists", "bool", &[("key", "int|string"), ("search", "array")]),
    ("array_keys", "int[]|string[]", &[("input", "array")]),
    ("array_map", "array", &[("callback", "callable"), ("input", "array")]),
    ("array_merge", "array", &[("arrays", "array")]),
    ("array_pop", "mixed", &[("stack", "array")]),
    ("array_push", "int", &[("stack", "array"), ("var", "mixed")]),
    ("array_search", "int|string|false", &[("needle", "mixed"), ("haystack", "array")]),
    ("array_shift", "mixed", &[("stack", "array")]),
    ("array_slice", "array", &[("input", "array"), ("offset", "int")]),
    ("array_values", "array", &[("input", "array")]),
    ("count", "int", &[("var", "array")]),
    ("explode", "string[]|false", &[("separator", "string"), ("str", "string")]),
    ("floatval", "float", &[("var", "mixed")]),
    ("get_class", "string|false", &[("object", "object")]),
    ("implode", "string", &[("glue", "string"), ("pieces", "array")]),
    ("implode'1", "string", &[("pieces", "array")]),
    ("in_array", "bool", &[("needle", "mixed"), ("haystack", "array")]),
    ("intdiv", "int", &[("numerator", "int"), ("divisor", "int")]),
    ("intval", "int", &[("var", "mixed")]),
    ("is_array", "bool", &[("var", "mixed")]),
    ("is_callable", "bool", &[("var", "mixed")]),
    ("is_int", "bool", &[("var", "mixed")]),
    ("is_null", "bool", &[("var", "mixed")]),
    ("is_numeric", "bool", &[("var", "mixed")]),
    ("is_string", "bool", &[("var", "mixed")]),
    ("json_decode", "mixed", &[("json", "string")]),
    ("json_encode", "string|false", &[("value", "mixed")]),
    ("max", "mixed", &[("values", "array")]),
    ("max'1", "mixed", &[("value1", "mixed"), ("value2", "mixed")]),
    ("min", "mixed", &[("values", "array")]),
    ("min'1", "mixed", &[("value1", "mixed"), ("value2", "mixed")]),
    ("preg_match", "int|false", &[("pattern", "string"), ("subject", "string")]),
    ("preg_replace", "string|string[]|null", &[("regex", "string"), ("replace", "string"), ("subject", "string")]),
    ("preg_split", "string[]|false", &[("pattern", "string"), ("subject", "string")]),
    ("round", "float", &[("number", "int|float")]),
    ("sprintf", "string", &[("format", "string"), ("args", "mixed")]),
    ("str_repeat", "string", &[("input", "string"), ("multiplier", "int")]),
    ("str_replace", "string|string[]", &[("search", "mixed"), ("replace", "mixed"), ("subject", "mixed")]),
    ("str_split", "string[]|false", &[("str", "string"), ("split_length", "int")]),
    ("strlen", "int", &[("string", "string")]),
    ("strpos", "int|false", &[("haystack", "string"), ("needle", "string")]),
    ("strrev", "string", &[("str", "string")]),
    ("strtolower", "string", &[("str", "string")]),
    ("strtoupper", "string", &[("str", "string")]),
    ("strval", "string", &[("var", "mixed")]),
    ("substr", "string|false", &[("str", "string"), ("start", "int")]),
    ("trim", "string", &[("str", "string")]),
    ("ucfirst", "string", &[("str", "string")]),
    ("usort", "bool", &[("array", "array"), ("cmp_function", "callable")]),
];

/// (class key, [(property name, property type)...])
pub(crate) const CLASS_SIGNATURES: &[(&str, &[(&str, &str)])] = &[
    (
        "arrayobject",
        &[("name", "string")],
    ),
    (
        "directoryiterator",
        &[("name", "string")],
    ),
    (
        "errorexception",
        &[("message", "string"), ("code", "int"), ("file", "string"), ("line", "int"), ("severity", "int")],
    ),
    (
        "exception",
        &[("message", "string"), ("code", "int"), ("file", "string"), ("line", "int")],
    ),
    (
        "libxmlerror",
        &[("level", "int"), ("code", "int"), ("column", "int"), ("message", "string"), ("file", "string"), ("line", "int")],
    ),
    (
        "pdostatement",
        &[("queryString", "string")],
    ),
];
