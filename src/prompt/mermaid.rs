//! Mermaid prompt text.

pub const HEADER: &str = concat!(
    intro_sections!(),
    output_requirements!("Mermaid"),
    r#"
7. Mermaid Label Syntax Requirements (CRITICAL - MUST FOLLOW)
   - **NEVER use unquoted labels containing special characters.** This will cause parse errors and the diagram will fail validation.
   - Labels containing ANY special characters (parentheses, slashes, hyphens, spaces, colons, commas, etc.) MUST be wrapped in double quotes.
   - **INCORRECT (will fail):**
     - `A[Presentation (CLI/UI)]`
     - `B[Cloud-Name]`
     - `C[Service: API]`
   - **CORRECT (required format):**
     - `A["Presentation (CLI/UI)"]`
     - `B["Cloud-Name"]`
     - `C["Service: API"]`
   - **Safe labels (no quotes needed):**
     - `D[User]`
     - `E[Database]`
     - `F[API_Service]`
   - When in doubt, wrap the label in double quotes. It is always safe to quote labels.
   - This syntax rule applies to ALL node labels, edge labels, and any text content in the diagram.
"#,
    closing_sections!("Mermaid"),
);

/// Quoting rules restated in every correction turn.
pub const CORRECTION_RULES: &str = r#"**CRITICAL: Mermaid Label Syntax Requirements**
- Labels containing ANY special characters (parentheses, slashes, hyphens, spaces, colons, commas, etc.) MUST be wrapped in double quotes.
- **INCORRECT:** `A[Presentation (CLI/UI)]` will cause parse errors
- **CORRECT:** `A["Presentation (CLI/UI)"]` (with double quotes around the label)
- When in doubt, wrap labels in double quotes. This is especially important if you see parse errors mentioning unexpected characters.
- This applies to ALL node labels, edge labels, and text content in the diagram."#;
