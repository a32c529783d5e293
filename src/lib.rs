mod parsers;
mod phylo;

pub type TreeFloat = f64;
pub type TreeInt = i64;

pub use parsers::ParseError;
pub use parsers::TreeParseError;
pub use parsers::newick::broker::NewickBroker;
pub use parsers::newick::broker::NewickBrokerElement;
pub use parsers::newick::parse_newick;
pub use parsers::newick::parse_placement_newick;
pub use parsers::newick::plugins;
pub use parsers::newick::reader::DefaultNames;
pub use parsers::newick::reader::NewickReader;
pub use parsers::newick::reader::NewickReaderOptions;
pub use parsers::newick::reader::Step;
pub use parsers::newick::write_newick;
pub use parsers::newick::write_placement_newick;
pub use parsers::newick::writer::NewickWriter;
pub use parsers::newick::writer::NewickWriterOptions;
pub use parsers::text::InputStream;
pub use parsers::text::Position;
pub use parsers::text::parse_quoted_string;
pub use phylo::data::DefaultEdgeData;
pub use phylo::data::DefaultNodeData;
pub use phylo::data::EdgeData;
pub use phylo::data::NodeData;
pub use phylo::data::PayloadError;
pub use phylo::data::PayloadKind;
pub use phylo::data::PlacementEdgeData;
pub use phylo::data::PlacementNodeData;
pub use phylo::edge::Edge;
pub use phylo::edge::EdgeId;
pub use phylo::functions::average_branch_length_tree;
pub use phylo::functions::branch_lengths;
pub use phylo::functions::find_node;
pub use phylo::functions::identical_topology;
pub use phylo::functions::node_names;
pub use phylo::functions::set_all_branch_lengths;
pub use phylo::link::Link;
pub use phylo::link::LinkId;
pub use phylo::node::Node;
pub use phylo::node::NodeId;
pub use phylo::placement::edge_num_to_edge_map;
pub use phylo::placement::has_correct_edge_nums;
pub use phylo::traversal::Levelorder;
pub use phylo::traversal::Postorder;
pub use phylo::traversal::Preorder;
pub use phylo::traversal::TraversalItem;
pub use phylo::tree::NodeLinks;
pub use phylo::tree::Tree;
pub use phylo::tree::TreeError;
