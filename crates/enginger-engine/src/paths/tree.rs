use std::ffi::OsString;
use std::path::PathBuf;

use crate::device::ShaderStage;

use super::arena::{NodeId, PathArena};
use super::{PathError, PathRole};

/// Environment variable naming the project source root.
pub const SRC_PATH_VAR: &str = "ENGINGER_SRC_PATH";

const RESOURCES_DIR: &str = "resources";
const SHADERS_DIR: &str = "shaders";
const CONFIG_FILE: &str = "config.json";

/// Where the tree root comes from when it is (re)initialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootSource {
    /// Read from the named environment variable on every initialization.
    EnvVar(String),
    /// A fixed root path.
    Fixed(String),
}

impl RootSource {
    /// Reads the root path string.
    ///
    /// No length limit applies; the value is used as-is.
    pub fn read(&self) -> Result<String, PathError> {
        let root = match self {
            RootSource::EnvVar(var) => {
                let value: OsString =
                    std::env::var_os(var).ok_or_else(|| PathError::EnvVarMissing { var: var.clone() })?;
                value
                    .into_string()
                    .map_err(|_| PathError::EnvVarNotUnicode { var: var.clone() })?
            }
            RootSource::Fixed(root) => root.clone(),
        };

        if root.is_empty() {
            return Err(PathError::EmptyRoot);
        }
        Ok(root)
    }
}

#[derive(Debug, Copy, Clone)]
struct Layout {
    root: NodeId,
    resources: NodeId,
    shaders: NodeId,
    config: NodeId,
}

/// Resolves resource roles to absolute filesystem paths.
///
/// The tree is built from a single root:
///
/// ```text
/// <root>
/// ├── resources
/// │   └── shaders
/// │       └── <registered shader files>
/// └── config.json
/// ```
///
/// Construction does not touch the root source. The tree initializes lazily on
/// the first [`absolute_path`](Self::absolute_path) or
/// [`add_shader_path`](Self::add_shader_path), or explicitly through
/// [`initialize`](Self::initialize). After [`teardown`](Self::teardown) the next
/// query re-reads the root source.
#[derive(Debug, Clone)]
pub struct ResourceTree {
    source: RootSource,
    arena: PathArena,
    layout: Option<Layout>,
    vertex_shader: Option<NodeId>,
    fragment_shader: Option<NodeId>,
}

impl ResourceTree {
    /// Resolver rooted at [`SRC_PATH_VAR`].
    pub fn from_env() -> Self {
        Self::with_source(RootSource::EnvVar(SRC_PATH_VAR.to_string()))
    }

    pub fn with_env_var(var: impl Into<String>) -> Self {
        Self::with_source(RootSource::EnvVar(var.into()))
    }

    pub fn with_root(root: impl Into<String>) -> Self {
        Self::with_source(RootSource::Fixed(root.into()))
    }

    pub fn with_source(source: RootSource) -> Self {
        Self {
            source,
            arena: PathArena::new(),
            layout: None,
            vertex_shader: None,
            fragment_shader: None,
        }
    }

    pub fn source(&self) -> &RootSource {
        &self.source
    }

    pub fn is_initialized(&self) -> bool {
        self.layout.is_some()
    }

    /// Reads the root source and builds the fixed tree.
    pub fn resolve_root(&mut self) -> Result<(), PathError> {
        let root = self.source.read()?;
        self.initialize(root);
        Ok(())
    }

    /// Builds the fixed tree under `root`, discarding any previous tree.
    pub fn initialize(&mut self, root: impl Into<String>) {
        self.teardown();

        let root = self.arena.push(root, None);
        let resources = self.arena.push(RESOURCES_DIR, Some(root));
        let shaders = self.arena.push(SHADERS_DIR, Some(resources));
        let config = self.arena.push(CONFIG_FILE, Some(root));

        self.layout = Some(Layout { root, resources, shaders, config });

        log::debug!("resource tree initialized at {}", self.arena.absolute_path(root));
    }

    fn ensure_initialized(&mut self) -> Result<Layout, PathError> {
        if self.layout.is_none() {
            self.resolve_root()?;
        }
        self.layout.ok_or(PathError::NotInitialized)
    }

    /// Registers `filename` under the shaders directory and binds the stage's
    /// role to it.
    ///
    /// An existing child with the same name is reused, so registering the same
    /// file twice never creates a second node.
    pub fn add_shader_path(&mut self, stage: ShaderStage, filename: &str) -> Result<NodeId, PathError> {
        let layout = self.ensure_initialized()?;

        let node = match self.arena.find_child(layout.shaders, filename) {
            Some(existing) => existing,
            None => self.arena.push(filename, Some(layout.shaders)),
        };

        match stage {
            ShaderStage::Vertex => self.vertex_shader = Some(node),
            ShaderStage::Fragment => self.fragment_shader = Some(node),
        }
        Ok(node)
    }

    /// Absolute path for `role`, initializing the tree first if needed.
    pub fn absolute_path(&mut self, role: PathRole) -> Result<PathBuf, PathError> {
        self.ensure_initialized()?;
        self.resolve(role)
    }

    /// Absolute path for `role` without lazy initialization.
    pub fn resolve(&self, role: PathRole) -> Result<PathBuf, PathError> {
        let layout = self.layout.ok_or(PathError::NotInitialized)?;
        let node = match role {
            PathRole::ConfigFile => Some(layout.config),
            PathRole::VertexShader => self.vertex_shader,
            PathRole::FragmentShader => self.fragment_shader,
        }
        .ok_or(PathError::RoleUnresolved(role))?;

        Ok(PathBuf::from(self.arena.absolute_path(node)))
    }

    /// Registers a shader file and returns its absolute path.
    pub fn shader_path(&mut self, stage: ShaderStage, filename: &str) -> Result<PathBuf, PathError> {
        self.add_shader_path(stage, filename)?;
        self.absolute_path(stage.into())
    }

    /// Drops every node and resets all named nodes.
    pub fn teardown(&mut self) {
        if self.layout.is_some() {
            log::debug!("resource tree torn down ({} nodes)", self.arena.len());
        }
        self.arena.clear();
        self.layout = None;
        self.vertex_shader = None;
        self.fragment_shader = None;
    }

    pub fn root(&self) -> Option<NodeId> {
        self.layout.map(|l| l.root)
    }

    pub fn resources_dir(&self) -> Option<NodeId> {
        self.layout.map(|l| l.resources)
    }

    pub fn shaders_dir(&self) -> Option<NodeId> {
        self.layout.map(|l| l.shaders)
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.arena.children(id)
    }

    pub fn name_of(&self, id: NodeId) -> Option<&str> {
        self.arena.name(id)
    }
}
