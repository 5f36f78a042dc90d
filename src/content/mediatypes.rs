use crate::media_type;

media_type!(ApplicationEpubZip, "application", "epub+zip");
media_type!(ApplicationGzip, "application", "gzip");
media_type!(ApplicationJson, "application", "json");
media_type!(ApplicationLdJson, "application", "ld+json");
media_type!(ApplicationOctetStream, "application", "octet-stream");
media_type!(ApplicationOgg, "application", "ogg");
media_type!(ApplicationPdf, "application", "pdf");
media_type!(ApplicationRtf, "application", "rtf");
media_type!(ApplicationVndRar, "application", "vnd.rar");
media_type!(ApplicationX7zCompressed, "application", "x-7z-compressed");
media_type!(ApplicationXBzip, "application", "x-bzip");
media_type!(ApplicationXBzip2, "application", "x-bzip2");
media_type!(ApplicationXCdf, "application", "x-cdf");
media_type!(ApplicationXCsh, "application", "x-csh");
media_type!(ApplicationXhtmlXml, "application", "xhtml+xml");
media_type!(ApplicationXHttpdPhp, "application", "x-httpd-php");
media_type!(ApplicationXml, "application", "xml");
media_type!(ApplicationXSh, "application", "x-sh");
media_type!(ApplicationXTar, "application", "x-tar");
media_type!(ApplicationZip, "application", "zip");
media_type!(Audio3gpp, "audio", "3gpp");
media_type!(Audio3gpp2, "audio", "3gpp2");
media_type!(AudioAac, "audio", "aac");
media_type!(AudioMidi, "audio", "midi");
media_type!(AudioMpeg, "audio", "mpeg");
media_type!(AudioOgg, "audio", "ogg");
media_type!(AudioOpus, "audio", "opus");
media_type!(AudioWav, "audio", "wav");
media_type!(AudioWebm, "audio", "webm");
media_type!(AudioXMidi, "audio", "x-midi");
media_type!(FontOtf, "font", "otf");
media_type!(FontTtf, "font", "ttf");
media_type!(FontWoff, "font", "woff");
media_type!(FontWoff2, "font", "woff2");
media_type!(ImageBmp, "image", "bmp");
media_type!(ImageGif, "image", "gif");
media_type!(ImageJpeg, "image", "jpeg");
media_type!(ImagePng, "image", "png");
media_type!(ImageSvgXml, "image", "svg+xml");
media_type!(ImageTiff, "image", "tiff");
media_type!(ImageWebp, "image", "webp");
media_type!(TextCalendar, "text", "calendar");
media_type!(TextCss, "text", "css");
media_type!(TextCsv, "text", "csv");
media_type!(TextHtml, "text", "html");
media_type!(TextJavascript, "text", "javascript");
media_type!(TextPlain, "text", "plain");
media_type!(Video3gpp, "video", "3gpp");
media_type!(Video3gpp2, "video", "3gpp2");
media_type!(VideoMp2t, "video", "mp2t");
media_type!(VideoMp4, "video", "mp4");
media_type!(VideoMpeg, "video", "mpeg");
media_type!(VideoOgg, "video", "ogg");
media_type!(VideoWebm, "video", "webm");
