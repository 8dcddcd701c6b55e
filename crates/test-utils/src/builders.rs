use taskdag::document::labels::EMPTY_MARKER;
use taskdag::document::render::render_dependencies;
use taskdag::document::{Document, Field, LabelStyle};
use taskdag::types::{Priority, TaskStatus};

/// Builder for plan document text to simplify test setup.
pub struct PlanBuilder {
    title: String,
    style: LabelStyle,
    tasks: Vec<TaskBuilder>,
    trailer: Option<String>,
}

impl PlanBuilder {
    pub fn new() -> Self {
        Self {
            title: "Plan".to_string(),
            style: LabelStyle::English,
            tasks: Vec::new(),
            trailer: None,
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// Write field labels in Chinese.
    pub fn chinese(mut self) -> Self {
        self.style = LabelStyle::Chinese;
        self
    }

    pub fn with_task(mut self, task: TaskBuilder) -> Self {
        self.tasks.push(task);
        self
    }

    /// A `## <heading>` section after the task list.
    pub fn with_trailer(mut self, heading: &str, body: &str) -> Self {
        self.trailer = Some(format!("## {heading}\n\n{body}\n"));
        self
    }

    pub fn build(self) -> String {
        let mut out = format!("# {}\n\n## Tasks\n\n", self.title);
        for task in &self.tasks {
            out.push_str(&task.render(self.style));
            out.push('\n');
        }
        if let Some(trailer) = &self.trailer {
            out.push_str(trailer);
        }
        out
    }

    pub fn build_document(self) -> Document {
        Document::parse(self.build())
    }
}

impl Default for PlanBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one task block.
#[derive(Debug, Clone)]
pub struct TaskBuilder {
    id: String,
    name: String,
    status: TaskStatus,
    priority: Priority,
    deps: Vec<String>,
    assignee: Option<String>,
    claimed_at: Option<String>,
    module: String,
    description: String,
    acceptance: String,
    files: Vec<String>,
}

impl TaskBuilder {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            status: TaskStatus::Pending,
            priority: Priority::P2,
            deps: vec![],
            assignee: None,
            claimed_at: None,
            module: "core".to_string(),
            description: format!("Implement {name}"),
            acceptance: format!("{name} works"),
            files: vec![],
        }
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.deps.push(dep.to_string());
        self
    }

    /// Sets assignee and claim time together, as a claim would.
    pub fn claimed_by(mut self, session: &str, at: &str) -> Self {
        self.assignee = Some(session.to_string());
        self.claimed_at = Some(at.to_string());
        self
    }

    pub fn module(mut self, module: &str) -> Self {
        self.module = module.to_string();
        self
    }

    pub fn file(mut self, pattern: &str) -> Self {
        self.files.push(pattern.to_string());
        self
    }

    pub fn render(&self, style: LabelStyle) -> String {
        let line = |field: Field, value: &str| format!("- **{}**: {}\n", field.label(style), value);
        let files = if self.files.is_empty() {
            EMPTY_MARKER.to_string()
        } else {
            self.files.join(", ")
        };

        let mut out = format!("### {}: {}\n", self.id, self.name);
        out.push_str(&line(Field::Status, self.status.as_str()));
        out.push_str(&line(
            Field::Assignee,
            self.assignee.as_deref().unwrap_or(EMPTY_MARKER),
        ));
        out.push_str(&line(
            Field::ClaimedAt,
            self.claimed_at.as_deref().unwrap_or(EMPTY_MARKER),
        ));
        out.push_str(&line(Field::Priority, self.priority.as_str()));
        out.push_str(&line(Field::Dependencies, &render_dependencies(&self.deps, style)));
        out.push_str(&line(Field::Module, &self.module));
        out.push_str(&line(Field::Description, &self.description));
        out.push_str(&line(Field::AcceptanceCriteria, &self.acceptance));
        out.push_str(&line(Field::RelatedFiles, &files));
        out
    }
}
