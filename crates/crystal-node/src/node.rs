use crystal_core::{DefaultValue, InputSpec, InputValue, IoType, Node, NodeDescriptor, NodeInputs, NodeOutputs, NodeRegistry};
use crate::config::UpscalerConfig;
use crate::upscaler::Upscaler;

pub const CLASS_NAME: &str = "CrystalUpscaler";
pub const DISPLAY_NAME: &str = "Crystal AI Upscaler";
pub const CATEGORY: &str = "CrystalAI";

/// Host binding for [`Upscaler`]
pub struct CrystalUpscaler {
    upscaler: Upscaler,
}

impl CrystalUpscaler {
    pub fn new(config: UpscalerConfig) -> Self {
        Self { upscaler: Upscaler::new(config) }
    }
}

impl Node for CrystalUpscaler {
    fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor {
            class_name: CLASS_NAME,
            display_name: DISPLAY_NAME,
            category: CATEGORY,
            function: "go",
            inputs: vec![
                InputSpec::required("image", IoType::Image),
                InputSpec::required("scale_factor", IoType::Int)
                    .with_default(DefaultValue::Int(2))
                    .with_range(1, 200),
                InputSpec::required("creativity", IoType::Int)
                    .with_default(DefaultValue::Int(0))
                    .with_range(0, 10),
                InputSpec::optional("api_key_override", IoType::String)
                    .with_default(DefaultValue::String("")),
            ],
            outputs: vec![IoType::Image],
        }
    }

    fn invoke(&self, inputs: NodeInputs) -> anyhow::Result<NodeOutputs> {
        let descriptor = self.descriptor();
        let image = inputs.image(&descriptor, "image")?;
        let scale_factor = inputs.int(&descriptor, "scale_factor")?;
        let creativity = inputs.int(&descriptor, "creativity")?;
        let api_key_override = inputs.string(&descriptor, "api_key_override")?;

        let output = self.upscaler.upscale(&image, scale_factor, creativity, &api_key_override)?;

        Ok(NodeOutputs(vec![InputValue::Image(output)]))
    }
}

/// Registry with every node this crate provides, configured from the environment
pub fn registry() -> NodeRegistry {
    registry_with(UpscalerConfig::from_env())
}

pub fn registry_with(config: UpscalerConfig) -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    registry.register(CrystalUpscaler::new(config));
    registry
}
