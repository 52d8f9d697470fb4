//! XML utilities over `roxmltree` DOM trees.

mod utils;

pub use utils::{
    element_tree, find_descendant, find_descendant_in_namespace, get_text, local_name,
    parse_document, strip_namespace,
};
