use log::error;
use web_sys::{WebGl2RenderingContext as GL, WebGlProgram, WebGlShader};

use crate::error::{RenderError, ShaderStage};

fn stage_kind(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => GL::VERTEX_SHADER,
        ShaderStage::Fragment => GL::FRAGMENT_SHADER,
    }
}

/// Compiles one shader; on failure the driver's info log is logged and returned.
pub fn compile_shader(
    gl: &GL,
    stage: ShaderStage,
    source: &str,
) -> Result<WebGlShader, RenderError> {
    let shader = gl
        .create_shader(stage_kind(stage))
        .ok_or(RenderError::ResourceCreation("shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    let compiled = gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false);
    if compiled {
        return Ok(shader);
    }

    let log = gl
        .get_shader_info_log(&shader)
        .unwrap_or_else(|| "unknown compile error".to_string());
    error!("{stage} shader: {log}");
    gl.delete_shader(Some(&shader));
    Err(RenderError::ShaderCompile { stage, log })
}

pub fn link_program(
    gl: &GL,
    vertex: &WebGlShader,
    fragment: &WebGlShader,
) -> Result<WebGlProgram, RenderError> {
    let program = gl
        .create_program()
        .ok_or(RenderError::ResourceCreation("program"))?;
    gl.attach_shader(&program, vertex);
    gl.attach_shader(&program, fragment);
    gl.link_program(&program);

    let linked = gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false);
    if linked {
        return Ok(program);
    }

    let log = gl
        .get_program_info_log(&program)
        .unwrap_or_else(|| "unknown link error".to_string());
    error!("program link: {log}");
    gl.delete_program(Some(&program));
    Err(RenderError::ProgramLink(log))
}

/// Compiles both stages and links them. Shader objects are released once linked.
pub fn build_program(
    gl: &GL,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<WebGlProgram, RenderError> {
    let vertex = compile_shader(gl, ShaderStage::Vertex, vertex_source)?;
    let fragment = match compile_shader(gl, ShaderStage::Fragment, fragment_source) {
        Ok(shader) => shader,
        Err(err) => {
            gl.delete_shader(Some(&vertex));
            return Err(err);
        }
    };

    let program = link_program(gl, &vertex, &fragment);
    gl.delete_shader(Some(&vertex));
    gl.delete_shader(Some(&fragment));
    program
}
