use crate::{RefactorError, Refactorer};

/// A small translation unit exercising the whole pipeline: an allocating
/// pointer-returning function, a void caller, and `main`.
pub const SAMPLE: &str = r#"#include <stdlib.h>
#include <string.h>

/* duplicate a label into fresh memory */
char *copy_label(const char *label) {
    char *fresh = strdup(label);
    return fresh;
}

void greet(void) {
    char *label = copy_label("hello");
    use_label(label);
}

int main(void) {
    greet();
    return 0;
}
"#;

/// Run the default pipeline over [SAMPLE].
pub fn refactor_sample() -> Result<String, RefactorError> {
    Refactorer::new().refactor_to_string(SAMPLE.as_bytes())
}
