//! Graphviz DOT prompt text.

pub const HEADER: &str = concat!(
    intro_sections!(),
    output_requirements!("Graphviz DOT"),
    r#"
7. Graphviz DOT Syntax Requirements (CRITICAL - MUST FOLLOW)
   - **Directed graphs:** Use `digraph G {` to start a directed graph
   - **Undirected graphs:** Use `graph G {` to start an undirected graph
   - **Node IDs:** Must be valid identifiers (letters, numbers, underscores) or quoted strings. Examples: `node1`, `"Node Name"`, `API_Service`
   - **Node labels:** Labels containing special characters (parentheses, slashes, hyphens, spaces, colons, commas, etc.) MUST be quoted. Use `[label="Node Label"]` syntax.
   - **INCORRECT (will fail):**
     - `node1[label=Presentation (CLI/UI)]`
     - `node2[label=Cloud-Name]`
     - `node3[label=Service: API]`
   - **CORRECT (required format):**
     - `node1[label="Presentation (CLI/UI)"]`
     - `node2[label="Cloud-Name"]`
     - `node3[label="Service: API"]`
   - **Safe labels (no quotes needed for simple identifiers):**
     - `User[label=User]`
     - `Database[label=Database]`
     - `API_Service[label=API_Service]`
   - **Edges:** Directed graphs use `->`, undirected graphs use `--`. Examples: `node1 -> node2`, `node1 -- node2`
   - **Edge labels:** Use `[label="Edge Label"]` syntax. Labels with special characters must be quoted.
   - **Attributes:** Use `[key=value, key2=value2]` syntax. String values containing special characters must be quoted.
   - **All strings containing special characters must be quoted.** When in doubt, wrap labels and string values in double quotes.
   - This syntax rule applies to ALL node labels, edge labels, and any text content in the diagram.
"#,
    closing_sections!("Graphviz DOT"),
);

/// Quoting rules restated in every correction turn.
pub const CORRECTION_RULES: &str = r#"**CRITICAL: Graphviz DOT Syntax Requirements**
- Node IDs must be valid identifiers (letters, numbers, underscores) or quoted strings
- Labels containing ANY special characters (parentheses, slashes, hyphens, spaces, colons, commas, etc.) MUST be wrapped in double quotes: `[label="Node Label"]`
- Directed graphs use `digraph G {`, undirected graphs use `graph G {`
- Edges use `->` for directed (digraph) or `--` for undirected (graph)
- Attributes use `[key=value, key2=value2]` syntax
- All strings containing special characters must be quoted
- **INCORRECT:** `node1[label=Presentation (CLI/UI)]` will cause parse errors
- **CORRECT:** `node1[label="Presentation (CLI/UI)"]` (with double quotes around the label)
- When in doubt, wrap labels in double quotes. This is especially important if you see parse errors mentioning unexpected characters.
- This applies to ALL node labels, edge labels, and text content in the diagram."#;
