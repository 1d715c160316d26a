pub mod codec;
pub mod node;
pub mod registry;
pub mod tensor;

pub use codec::{decode_rgb, encode_png};
pub use node::{DefaultValue, InputSpec, InputValue, IoType, Node, NodeDescriptor, NodeInputError, NodeInputs, NodeOutputs};
pub use registry::NodeRegistry;
pub use tensor::{ImageBatch, ImageTensor, TensorError};
