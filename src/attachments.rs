/// Builds public URLs for stored leave attachments.
///
/// The base URL comes from configuration; uploads themselves are stored
/// elsewhere and only their file names reach this service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentLinker {
    base_url: String,
}

impl AttachmentLinker {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for one stored file. Names that already are URLs pass through.
    pub fn link(&self, file_name: &str) -> String {
        let name = file_name.trim();
        if name.starts_with("http://") || name.starts_with("https://") {
            return name.to_string();
        }
        format!("{}/{}", self.base_url, name.trim_start_matches('/'))
    }

    /// Links every non-blank name, dropping blanks.
    pub fn link_all(&self, file_names: &[String]) -> Vec<String> {
        file_names
            .iter()
            .filter(|name| !name.trim().is_empty())
            .map(|name| self.link(name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_base_and_file_name() {
        let linker = AttachmentLinker::new("http://files.local:8081/uploads/leaves/");
        assert_eq!(
            linker.link("/note.pdf"),
            "http://files.local:8081/uploads/leaves/note.pdf"
        );
    }

    #[test]
    fn keeps_absolute_urls_and_drops_blanks() {
        let linker = AttachmentLinker::new("http://files.local");
        let linked = linker.link_all(&[
            "a.png".to_string(),
            "  ".to_string(),
            "https://cdn.example.org/b.png".to_string(),
        ]);
        assert_eq!(
            linked,
            vec![
                "http://files.local/a.png".to_string(),
                "https://cdn.example.org/b.png".to_string()
            ]
        );
    }
}
