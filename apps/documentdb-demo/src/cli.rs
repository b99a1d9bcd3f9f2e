use clap::{Parser, Subcommand, ValueEnum};
use database::mongodb::ConfigSource;
use domain_documents::IndexExistsPolicy;

#[derive(Parser, Debug)]
#[command(name = "documentdb-demo")]
#[command(about = "CRUD, queries, aggregation and vector search against a DocumentDB gateway")]
pub struct Cli {
    /// Where connection settings come from
    #[arg(long, value_enum, default_value_t = Source::Local, global = true)]
    pub source: Source,

    /// Accept any TLS certificate (self-signed gateways only)
    #[arg(long, global = true)]
    pub tls_allow_invalid_certificates: bool,

    /// Database name. Defaults depend on the demo.
    #[arg(long, env = "DOCUMENTDB_DATABASE_NAME", global = true)]
    pub database: Option<String>,

    /// Collection name. Defaults depend on the demo.
    #[arg(long, env = "DOCUMENTDB_COLLECTION_NAME", global = true)]
    pub collection: Option<String>,

    /// Server selection and connect timeout
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// What to do when the vector index name is already taken
    #[arg(long, value_enum, default_value_t = IndexExists::Skip, global = true)]
    pub index_exists: IndexExists,

    /// Drop the collection before running so the demo is repeatable
    #[arg(long, global = true)]
    pub reset: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create, read, update and delete user documents
    Crud,

    /// Insert products, run a filter query and an average-price aggregation
    Query,

    /// DiskANN index over 3-dimensional embeddings, plain and filtered search
    Vector,

    /// OpenAI embeddings for product descriptions and a free-text search
    Semantic {
        /// Text to search for
        #[arg(short, long, default_value = "something to listen to music with")]
        query: String,

        /// Number of results
        #[arg(short, long, default_value_t = 3)]
        k: u32,
    },

    /// Check that the gateway answers and report latency
    Ping,
}

impl Command {
    pub fn default_database(&self) -> &'static str {
        match self {
            Command::Vector | Command::Semantic { .. } => "vector_db",
            Command::Crud | Command::Query | Command::Ping => "demo_db",
        }
    }

    pub fn default_collection(&self) -> &'static str {
        match self {
            Command::Crud => "users",
            Command::Semantic { .. } => "product_descriptions",
            Command::Query | Command::Vector | Command::Ping => "products",
        }
    }

    /// Whether the command needs `OPENAI_API_KEY`
    pub fn needs_embeddings(&self) -> bool {
        matches!(self, Command::Semantic { .. })
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Literal local gateway settings (localhost:10260 over TLS)
    Local,
    /// DOCUMENTDB_CONNECTION_STRING and friends
    Env,
}

impl From<Source> for ConfigSource {
    fn from(source: Source) -> Self {
        match source {
            Source::Local => ConfigSource::Local,
            Source::Env => ConfigSource::Environment,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexExists {
    Fail,
    Skip,
}

impl From<IndexExists> for IndexExistsPolicy {
    fn from(value: IndexExists) -> Self {
        match value {
            IndexExists::Fail => IndexExistsPolicy::Fail,
            IndexExists::Skip => IndexExistsPolicy::Skip,
        }
    }
}
